use serde_json::{json, Value};

/// Tool definitions advertised through `tools/list`
pub fn tool_definitions() -> Vec<Value> {
    vec![
        json!({
            "name": "check_violation",
            "description": "Check an action for production-policy violations (mock data, placeholders, hardcoded secrets, ...) before performing it",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "action": {
                        "type": "string",
                        "description": "Name of the action about to be taken, e.g. write_file"
                    },
                    "parameters": {
                        "description": "Arguments of the action; any JSON value"
                    },
                    "context": {
                        "type": "string",
                        "description": "Free-text context for the action"
                    }
                },
                "required": ["action"]
            }
        }),
        json!({
            "name": "consult",
            "description": "Ask Ember for a recommendation",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "question": {
                        "type": "string",
                        "description": "What you need advice on"
                    },
                    "options": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Candidate options (optional)"
                    },
                    "context": {
                        "type": "string",
                        "description": "Extra context (optional)"
                    }
                },
                "required": ["question"]
            }
        }),
        json!({
            "name": "chat",
            "description": "Talk with Ember",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "message": {
                        "type": "string",
                        "description": "Message for Ember"
                    }
                },
                "required": ["message"]
            }
        }),
        json!({
            "name": "get_mood",
            "description": "Get Ember's current mood and stats",
            "inputSchema": {
                "type": "object",
                "properties": {}
            }
        }),
        json!({
            "name": "get_feedback",
            "description": "Summarize reported outcomes over a timeframe",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "timeframe": {
                        "type": "string",
                        "enum": ["last_action", "session", "recent"],
                        "description": "Which outcomes to summarize (default: recent)"
                    }
                }
            }
        }),
        json!({
            "name": "learn_from_outcome",
            "description": "Report how an action turned out",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "action": {
                        "type": "string",
                        "description": "The action that was performed"
                    },
                    "success": {
                        "type": "boolean",
                        "description": "Whether it succeeded"
                    },
                    "outcome": {
                        "type": "string",
                        "description": "What happened"
                    },
                    "quality_score": {
                        "type": "number",
                        "description": "Quality of the result (0-100, optional; fractions are rounded)",
                        "minimum": 0,
                        "maximum": 100
                    }
                },
                "required": ["action", "success", "outcome"]
            }
        }),
        json!({
            "name": "feed_context",
            "description": "Tell Ember what you are working on so checks can be scored in context",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "task": {
                        "type": "string",
                        "description": "Current task"
                    },
                    "task_type": {
                        "type": "string",
                        "enum": ["development", "testing", "monitoring", "refactoring", "unknown"],
                        "description": "Kind of work (optional)"
                    },
                    "goal": {
                        "type": "string",
                        "description": "What the task should achieve (optional)"
                    }
                },
                "required": ["task"]
            }
        }),
        json!({
            "name": "learn_from_correction",
            "description": "Correct a violation flag so similar actions are scored differently in future",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "violation_type": {
                        "type": "string",
                        "description": "Category of the flagged violation, e.g. mock_data"
                    },
                    "user_explanation": {
                        "type": "string",
                        "description": "Why the flag was right or wrong (optional)"
                    },
                    "was_correct": {
                        "type": "boolean",
                        "description": "Whether the original flag was correct"
                    },
                    "context": {
                        "type": "string",
                        "description": "Text that identifies similar actions; matched as a substring of future action names"
                    }
                },
                "required": ["violation_type", "was_correct", "context"]
            }
        }),
        json!({
            "name": "get_learning_stats",
            "description": "Show what Ember has learned from corrections",
            "inputSchema": {
                "type": "object",
                "properties": {}
            }
        }),
    ]
}
