//! Placeholder integrations for commands that never reach them.
//!
//! The completion sweep shares [`RequestService`] with the matching
//! flow but sends no notifications itself; these stubs satisfy the
//! service's integration bounds and fail loudly if anything actually
//! calls them.
//!
//! [`RequestService`]: mentora_match::RequestService

use uuid::Uuid;

use mentora_core::error::{MentoraError, MentoraResult};
use mentora_core::integrations::{ChatService, DirectoryService, DirectoryUser};

pub struct NullDirectory;

impl DirectoryService for NullDirectory {
    async fn get_user_by_id(&self, _id: Uuid) -> MentoraResult<DirectoryUser> {
        Err(not_configured("directory"))
    }

    async fn get_users_by_email(&self, _emails: &[String]) -> MentoraResult<Vec<DirectoryUser>> {
        Err(not_configured("directory"))
    }
}

pub struct NullChat;

impl ChatService for NullChat {
    async fn send_message(&self, _recipient: &str, _text: &str) -> MentoraResult<()> {
        Err(not_configured("chat"))
    }
}

fn not_configured(service: &str) -> MentoraError {
    MentoraError::Integration {
        service: service.into(),
        reason: "no client configured for this command".into(),
    }
}
