//! Operator input DTOs with garde validation.
//!
//! These structs validate console input before it reaches the REST store.

use garde::Validate;
use serde::Deserialize;

use crate::error::FeedError;

/// Validation constants
const MAX_USER_ID_LENGTH: usize = 128;
const MAX_CONVERSATION_ID_LENGTH: usize = 128;
const MAX_REPLY_LENGTH: usize = 4096;

/// Replies made only of whitespace are rejected
fn validate_not_blank(value: &str, _ctx: &()) -> garde::Result {
    if value.trim().is_empty() {
        return Err(garde::Error::new("Reply cannot be blank"));
    }
    Ok(())
}

/// Input for sending a reply to a customer
#[derive(Debug, Deserialize, Validate)]
#[garde(context(()))]
pub struct SendReplyInput {
    #[garde(length(min = 1, max = MAX_USER_ID_LENGTH))]
    pub user_id: String,
    #[garde(length(chars, min = 1, max = MAX_REPLY_LENGTH), custom(validate_not_blank))]
    pub text: String,
}

/// Input for selecting a conversation transcript
#[derive(Debug, Deserialize, Validate)]
#[garde(context(()))]
pub struct SelectConversationInput {
    #[garde(length(min = 1, max = MAX_USER_ID_LENGTH))]
    pub user_id: String,
}

/// Input for marking a conversation as managed
#[derive(Debug, Deserialize, Validate)]
#[garde(context(()))]
pub struct MarkManagedInput {
    #[garde(length(min = 1, max = MAX_CONVERSATION_ID_LENGTH))]
    pub conversation_id: String,
}

/// Helper trait to convert garde validation errors to FeedError
pub trait ValidateExt {
    fn validate_input(&self) -> Result<(), FeedError>;
}

impl<T: Validate<Context = ()>> ValidateExt for T {
    fn validate_input(&self) -> Result<(), FeedError> {
        self.validate().map_err(FeedError::from)
    }
}
