//! Function-calling descriptor for the outfit analysis tool.

use serde_json::{json, Value};

/// Name the chat engine uses to call the analysis.
pub const OOTD_TOOL_NAME: &str = "ootd";

/// OpenAI-style function descriptor offered to the chat model.
pub fn ootd_tool_definition() -> Value {
    json!({
        "type": "function",
        "function": {
            "name": OOTD_TOOL_NAME,
            "description": "Read an image from the local data directory, have a vision model \
describe the person in it, and turn the description into an outfit-advice prompt for the \
assistant to answer in natural language.",
            "parameters": {
                "type": "object",
                "properties": {
                    "file_name": {
                        "type": "string",
                        "description": "Name of an image file in the project's data/ directory, e.g. image_xxx.jpg"
                    },
                    "lang": {
                        "type": "string",
                        "description": "Answer language, e.g. en_US, zh_CN, zh_HK, ja_JP"
                    },
                    "status": {
                        "type": "string",
                        "description": "The user's current scene or need, e.g. commuting, job interview, shopping"
                    }
                },
                "required": ["file_name", "status"]
            }
        }
    })
}
