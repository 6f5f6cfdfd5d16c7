use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&success_document(message, data))?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an empty listing in the appropriate format
pub fn output_empty_collection(output_format: &OutputFormat, collection_name: &str, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ collection_name: [] }))?);
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

/// Object fields of `data` are merged beside `success` and `message`
fn success_document(message: &str, data: Option<Value>) -> Value {
    let mut response = json!({
        "success": true,
        "message": message
    });

    if let (Some(Value::Object(extra)), Some(target)) = (data, response.as_object_mut()) {
        target.extend(extra);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_fields_are_merged_into_success_document() {
        let doc = success_document("Demo reset", Some(json!({ "copiedCards": 3 })));
        assert_eq!(doc["success"], true);
        assert_eq!(doc["message"], "Demo reset");
        assert_eq!(doc["copiedCards"], 3);
    }

    #[test]
    fn non_object_data_is_ignored() {
        let doc = success_document("ok", Some(json!([1, 2])));
        assert_eq!(doc.as_object().unwrap().len(), 2);
    }
}
