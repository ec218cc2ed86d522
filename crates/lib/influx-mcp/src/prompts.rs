//! MCP prompts.

use rmcp::ErrorData;
use rmcp::model::{
    ErrorCode,
    GetPromptResult,
    JsonObject,
    Prompt,
    PromptArgument,
    PromptMessage,
    PromptMessageRole,
};

use crate::helpers;

pub const REVIEW_CODE: &str = "review-code";

#[must_use]
pub fn list_prompts() -> Vec<Prompt> {
    vec![Prompt::new(
        REVIEW_CODE,
        Some("Ask for a review of a code snippet."),
        Some(vec![PromptArgument {
            name: "code".into(),
            title: None,
            description: Some("The code to review".into()),
            required: Some(true),
        }]),
    )]
}

/// Renders a prompt by name.
///
/// # Errors
/// Returns `INVALID_PARAMS` for an unknown prompt or a missing required argument.
pub fn get_prompt(name: &str, args: &JsonObject) -> Result<GetPromptResult, ErrorData> {
    match name {
        REVIEW_CODE => {
            let code = args
                .get("code")
                .and_then(serde_json::Value::as_str)
                .ok_or_else(|| {
                    helpers::mcp_err(ErrorCode::INVALID_PARAMS, "missing required argument: code")
                })?;
            Ok(GetPromptResult {
                description: None,
                messages: vec![PromptMessage::new_text(
                    PromptMessageRole::User,
                    format!("Please review this code:\n\n{code}"),
                )],
            })
        }
        _ => Err(helpers::mcp_err(
            ErrorCode::INVALID_PARAMS,
            format!("unknown prompt: {name}"),
        )),
    }
}
