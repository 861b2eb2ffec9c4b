use bson::{Bson, Document};
use tessera_query::FieldPath;

/// Write `value` at `path`, creating intermediate sub-documents.
///
/// Overwrites an existing value. A non-document found on the way is replaced
/// by an empty document.
pub(crate) fn set_path(doc: &mut Document, path: &FieldPath, value: Bson) {
    let Some((last, parents)) = path.components().split_last() else {
        return;
    };

    let mut current = doc;
    for component in parents {
        let slot = current
            .entry(component.name().to_string())
            .or_insert_with(|| Bson::Document(Document::new()));
        if !matches!(slot, Bson::Document(_)) {
            *slot = Bson::Document(Document::new());
        }
        let Bson::Document(next) = slot else {
            return;
        };
        current = next;
    }
    current.insert(last.name().to_string(), value);
}
