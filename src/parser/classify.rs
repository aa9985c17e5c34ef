use crate::record::{Record, RecordBatch};

const TEL_MARKER: &str = "Tel: ";
const WEB_MARKER: &str = "http";
// Banner text the listing pages interleave with entries.
const BOILERPLATE: &[&str] = &["As featured in"];

/// Turn the lines of one block into a record.
///
/// The first line is the name. Every later line is routed to exactly one field:
/// phone lines win over website lines, and anything else counts as address
/// until a phone number has been seen. After that, unclassified lines are dropped.
pub fn classify<S: AsRef<str>>(lines: &[S]) -> Record {
    let mut record = Record::default();

    for (i, line) in lines.iter().enumerate() {
        let line = line.as_ref();

        if i == 0 {
            record.name = line.to_string();
            continue;
        }

        if line.contains(TEL_MARKER) {
            for fragment in line.split(',').filter(|f| f.contains(TEL_MARKER)) {
                record.contact = fragment.replace(TEL_MARKER, "").trim().to_string();
            }
        } else if line.contains(WEB_MARKER) {
            record.website = line.to_string();
        } else if record.contact.is_empty() && !is_boilerplate(line) {
            if record.address.is_empty() {
                record.address = line.to_string();
            } else {
                record.address.push(' ');
                record.address.push_str(line);
            }
        }
    }

    record
}

pub fn classify_block(block: &str) -> Record {
    let lines: Vec<&str> = block.split('\n').collect();
    classify(&lines)
}

pub fn classify_all<S: AsRef<str>>(blocks: &[S]) -> RecordBatch {
    blocks.iter().map(|b| classify_block(b.as_ref())).collect()
}

fn is_boilerplate(line: &str) -> bool {
    BOILERPLATE.iter().any(|b| line.contains(b))
}
