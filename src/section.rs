//! Section processing: parse every file of a section in discovery order.

use crate::config::Mode;
use crate::model::{Section, SourceFile};
use crate::parser::{self, annotation::UntaggedBlocks};

/// Parse every readable file of `section`. Unreadable files keep their read
/// diagnostic and contribute no records.
pub fn process(section: &mut Section, policy: UntaggedBlocks) {
    let mode = section.mode;
    for file in &mut section.files {
        process_file(file, mode, policy);
    }
}

/// Parse one file, attaching records and diagnostics to it.
pub fn process_file(file: &mut SourceFile, mode: Option<Mode>, policy: UntaggedBlocks) {
    let Some(text) = file.raw_text.as_deref() else {
        return;
    };

    let (family, dialect) = Mode::resolve(mode, &file.extension);
    let parsed = parser::parse(text, family, dialect, policy);

    file.records = parsed
        .records
        .into_iter()
        .map(|mut record| {
            record.source_path = file.path.clone();
            record.source_extension = file.extension.clone();
            record
        })
        .collect();
    file.diagnostics.extend(parsed.diagnostics);
}
