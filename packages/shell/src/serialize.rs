use crate::token::TokenGroup;

/// Serialize tokenized pipeline stages to a JSON string.
pub fn serialize_groups(groups: &[TokenGroup]) -> Result<String, serde_json::Error> {
    serde_json::to_string(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    #[test]
    fn serialize_single_group() {
        let json = serialize_groups(&tokenize("farm add -t mammal")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["tokens"][0], "farm");
        assert_eq!(value[0]["tokens"][3], "mammal");
        assert_eq!(value[0]["flow"], "None");
    }

    #[test]
    fn serialize_pipeline() {
        let json = serialize_groups(&tokenize("ls | grep x > out.txt")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let groups = value.as_array().unwrap();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[1]["flow"], "Pipe");
        assert_eq!(groups[2]["flow"], "Redirect");
        assert_eq!(groups[2]["tokens"][0], "out.txt");
    }

    #[test]
    fn serialize_empty_line() {
        assert_eq!(serialize_groups(&tokenize("   ")).unwrap(), "[]");
    }
}
