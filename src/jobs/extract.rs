use crate::errors::FramecastError;
use crate::provider::{JobOutput, JobRecord};

/// Normalize provider output to the one URL callers care about.
pub fn extract_primary_url(output: &JobOutput) -> Result<String, FramecastError> {
    let url = match output {
        JobOutput::Url(url) => url.as_str(),
        JobOutput::Urls(urls) => urls.first().map(String::as_str).unwrap_or_default(),
        JobOutput::Other(value) => {
            return Err(FramecastError::EmptyResult(format!("unrecognized output shape: {}", value)));
        }
    };

    if url.is_empty() {
        return Err(FramecastError::EmptyResult("provider returned no output URL".into()));
    }
    Ok(url.to_string())
}

pub fn extract_from_record(record: &JobRecord) -> Result<String, FramecastError> {
    match &record.output {
        Some(output) => extract_primary_url(output),
        None => Err(FramecastError::EmptyResult(format!("job {} finished without output", record.id))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_returns_first() {
        let output = JobOutput::Urls(vec!["a".into(), "b".into()]);
        assert_eq!(extract_primary_url(&output).unwrap(), "a");
    }

    #[test]
    fn test_single_string_returned_as_is() {
        assert_eq!(extract_primary_url(&JobOutput::Url("x".into())).unwrap(), "x");
    }

    #[test]
    fn test_empty_list_is_empty_result() {
        let err = extract_primary_url(&JobOutput::Urls(vec![])).unwrap_err();
        assert!(matches!(err, FramecastError::EmptyResult(_)));
    }

    #[test]
    fn test_empty_string_is_empty_result() {
        let err = extract_primary_url(&JobOutput::Url(String::new())).unwrap_err();
        assert!(matches!(err, FramecastError::EmptyResult(_)));
    }

    #[test]
    fn test_unrecognized_shape_is_empty_result() {
        let output = JobOutput::Other(serde_json::json!({"video": "a"}));
        assert!(matches!(extract_primary_url(&output), Err(FramecastError::EmptyResult(_))));
    }

    #[test]
    fn test_record_without_output() {
        let record = JobRecord {
            id: "p9".into(),
            status: crate::provider::JobStatus::Succeeded,
            output: None,
            error_message: None,
            created_at: chrono::Utc::now(),
            started_at: None,
            completed_at: None,
            metrics: None,
        };
        let err = extract_from_record(&record).unwrap_err();
        assert!(matches!(err, FramecastError::EmptyResult(msg) if msg.contains("p9")));
    }
}
