use std::io::Read;

use super::types::Feedback;
use crate::error::DecodeError;

/// Decodes one aggregate report XML document read from `reader`.
///
/// This is a structural mapping only. Unknown elements are skipped and
/// missing optional elements come back empty.
pub fn parse_feedback<R: Read>(name: &str, reader: R) -> Result<Feedback, DecodeError> {
	serde_xml_rs::from_reader(reader).map_err(|source| DecodeError::Xml {
		name: name.to_string(),
		source,
	})
}
