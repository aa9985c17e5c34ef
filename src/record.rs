use serde::{Deserialize, Serialize};

/// One directory entry pulled out of a listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    pub address: String,
    pub contact: String,
    pub website: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<i64>,
}

/// Records in document order. The index of a record is its provisional key.
pub type RecordBatch = Vec<Record>;

/// Set `category` on every record in the batch.
pub fn tag(batch: RecordBatch, category: i64) -> RecordBatch {
    batch
        .into_iter()
        .map(|r| Record {
            category: Some(category),
            ..r
        })
        .collect()
}

/// Apply an optional category; `None` leaves the batch untouched.
pub fn tag_optional(batch: RecordBatch, category: Option<i64>) -> RecordBatch {
    match category {
        Some(c) => tag(batch, c),
        None => batch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> Record {
        Record {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn tag_sets_every_record() {
        let batch = tag(vec![named("A"), named("B")], 1);
        assert_eq!(batch.len(), 2);
        assert!(batch.iter().all(|r| r.category == Some(1)));
    }

    #[test]
    fn tag_overwrites_existing_category() {
        let batch = tag(tag(vec![named("A")], 0), 1);
        assert_eq!(batch[0].category, Some(1));
    }

    #[test]
    fn untagged_record_omits_category() {
        let json = serde_json::to_value(named("Ambulans")).unwrap();
        assert!(json.get("category").is_none());

        let tagged = serde_json::to_value(&tag(vec![named("Ambulans")], 0)[0]).unwrap();
        assert_eq!(tagged["category"], 0);
    }

    #[test]
    fn tag_optional_none_is_identity() {
        let batch = vec![named("A"), named("B")];
        assert_eq!(tag_optional(batch.clone(), None), batch);
    }
}
