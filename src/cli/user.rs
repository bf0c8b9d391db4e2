use anyhow::{bail, Result};

use crate::crm::Crm;
use crate::models::User;
use crate::store::Row;

/// Register a user. Users with a Telegram chat id receive digests, alerts
/// and reminders.
pub fn run_user_add(crm: &Crm, username: &str, telegram_chat_id: Option<&str>) -> Result<User> {
    let username = username.trim();
    if username.is_empty() {
        bail!("username cannot be empty");
    }
    if crm.users.find_by_field("username", username)?.is_some() {
        bail!("user '{}' already exists", username);
    }

    let mut fields = Row::new();
    fields.insert("username".to_string(), username.to_string());
    if let Some(chat_id) = telegram_chat_id.map(str::trim).filter(|c| !c.is_empty()) {
        fields.insert("telegram_chat_id".to_string(), chat_id.to_string());
    }

    let user = crm.users.create(fields)?;
    println!("Added user {} ({})", user.username, user.id);
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use std::sync::Arc;

    #[test]
    fn test_add_user() {
        let crm = Crm::open_memory(Arc::new(SystemClock)).unwrap();
        let user = run_user_add(&crm, " sam ", Some("42")).unwrap();
        assert_eq!(user.username, "sam");
        assert_eq!(user.telegram_chat_id, "42");

        assert!(run_user_add(&crm, "sam", None).is_err());
        assert!(run_user_add(&crm, "  ", None).is_err());
        assert_eq!(crm.users.all().unwrap().len(), 1);
    }
}
