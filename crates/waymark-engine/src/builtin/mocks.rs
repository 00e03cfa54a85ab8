use serde_json::json;
use waymark_common::mock::{MockRule, ResponseTemplate};

pub const SESSION_PATTERN: &str = "**/api/auth/session";
pub const NOTIFICATIONS_PATTERN: &str = "**/api/notifications";

/// Pretend a user is signed in.
pub fn authenticated_session() -> MockRule {
    MockRule::new(
        SESSION_PATTERN,
        ResponseTemplate::json(&json!({
            "user": {
                "name": "Test User",
                "email": "test@example.com",
                "image": "https://github.com/shadcn.png"
            },
            "expires": "2099-01-01T00:00:00.000Z"
        })),
    )
}

/// Notification feed holding one unread system notification.
pub fn system_notification(text: &str) -> MockRule {
    MockRule::new(
        NOTIFICATIONS_PATTERN,
        ResponseTemplate::json(&json!({
            "success": true,
            "notifications": [{
                "id": "test-1",
                "type": "system",
                "text": text,
                "read": false,
                "createdAt": "2023-10-27T10:00:00Z",
                "fromUser": null
            }]
        })),
    )
}
