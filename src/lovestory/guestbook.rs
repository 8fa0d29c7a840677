//! Guestbook repository: free-standing messages with replies and reactions.
//!
//! The whole book lives under one `list` key, newest first. Replies prepend
//! (newest first), the opposite of media comment replies. Reactions are
//! de-duplicated per client: `reacted_by` remembers each client's current
//! emoji, and switching decrements the old tally (floored at zero) before
//! incrementing the new one. Clicking the same emoji again changes nothing.
//!
//! Message length is capped by the submitting surface, not here.

use crate::client::ClientId;
use crate::error::Result;
use crate::model::{GuestbookMessage, Reply};
use crate::store::{Partition, StoreBackend};
use std::collections::BTreeMap;
use tracing::warn;
use uuid::Uuid;

const LIST_KEY: &str = "list";

/// Reaction state handed back to the caller after a click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionUpdate {
    pub reactions: BTreeMap<String, u32>,
    pub user_reaction: String,
}

fn load_list<S: StoreBackend>(store: &S) -> Result<Vec<GuestbookMessage>> {
    Ok(store
        .get_json::<Vec<GuestbookMessage>>(Partition::Messages, LIST_KEY)?
        .unwrap_or_default())
}

fn save_list<S: StoreBackend>(store: &mut S, list: &[GuestbookMessage]) -> Result<()> {
    store.set_json(Partition::Messages, LIST_KEY, &list)
}

/// All messages, newest first.
pub fn list_messages<S: StoreBackend>(store: &S) -> Vec<GuestbookMessage> {
    match load_list(store) {
        Ok(list) => list,
        Err(err) => {
            warn!(error = %err, "list_messages failed");
            Vec::new()
        }
    }
}

/// Prepend a new message with empty replies and reactions.
pub fn add_message<S: StoreBackend>(
    store: &mut S,
    name: Option<String>,
    text: String,
) -> Option<GuestbookMessage> {
    match try_add_message(store, name, text) {
        Ok(msg) => Some(msg),
        Err(err) => {
            warn!(error = %err, "add_message failed");
            None
        }
    }
}

fn try_add_message<S: StoreBackend>(
    store: &mut S,
    name: Option<String>,
    text: String,
) -> Result<GuestbookMessage> {
    let msg = GuestbookMessage::new(name, text);
    let mut list = load_list(store)?;
    list.insert(0, msg.clone());
    save_list(store, &list)?;
    Ok(msg)
}

/// Remove a message. Returns false when the id was not present.
pub fn delete_message<S: StoreBackend>(store: &mut S, id: Uuid) -> bool {
    match try_delete_message(store, id) {
        Ok(existed) => existed,
        Err(err) => {
            warn!(%id, error = %err, "delete_message failed");
            false
        }
    }
}

fn try_delete_message<S: StoreBackend>(store: &mut S, id: Uuid) -> Result<bool> {
    let mut list = load_list(store)?;
    let before = list.len();
    list.retain(|m| m.id != id);
    if list.len() == before {
        return Ok(false);
    }
    save_list(store, &list)?;
    Ok(true)
}

/// Prepend a reply to a message (newest first). `None` for unknown ids.
pub fn add_reply<S: StoreBackend>(
    store: &mut S,
    message_id: Uuid,
    name: Option<String>,
    text: String,
) -> Option<Reply> {
    match try_add_reply(store, message_id, name, text) {
        Ok(reply) => reply,
        Err(err) => {
            warn!(%message_id, error = %err, "add_reply failed");
            None
        }
    }
}

fn try_add_reply<S: StoreBackend>(
    store: &mut S,
    message_id: Uuid,
    name: Option<String>,
    text: String,
) -> Result<Option<Reply>> {
    let mut list = load_list(store)?;
    let Some(target) = list.iter_mut().find(|m| m.id == message_id) else {
        return Ok(None);
    };
    let reply = Reply::new(name, text);
    target.replies.insert(0, reply.clone());
    save_list(store, &list)?;
    Ok(Some(reply))
}

/// React to a message, keeping at most one active emoji per client.
///
/// Switching emoji moves the client's vote: the old tally is decremented
/// (never below zero, and the zeroed entry stays visible) and the new one
/// incremented. Repeating the current emoji is a no-op that still returns
/// the current state; it does not toggle the reaction off.
pub fn add_reaction<S: StoreBackend>(
    store: &mut S,
    message_id: Uuid,
    client: &ClientId,
    emoji: &str,
) -> Option<ReactionUpdate> {
    match try_add_reaction(store, message_id, client, emoji) {
        Ok(update) => update,
        Err(err) => {
            warn!(%message_id, error = %err, "add_reaction failed");
            None
        }
    }
}

fn try_add_reaction<S: StoreBackend>(
    store: &mut S,
    message_id: Uuid,
    client: &ClientId,
    emoji: &str,
) -> Result<Option<ReactionUpdate>> {
    let mut list = load_list(store)?;
    let Some(target) = list.iter_mut().find(|m| m.id == message_id) else {
        return Ok(None);
    };

    let prev = target.reacted_by.get(client.as_str()).cloned();

    if prev.as_deref() == Some(emoji) {
        return Ok(Some(ReactionUpdate {
            reactions: target.reactions.clone(),
            user_reaction: emoji.to_string(),
        }));
    }

    if let Some(prev) = prev {
        if let Some(count) = target.reactions.get_mut(&prev) {
            if *count > 0 {
                *count -= 1;
            }
        }
    }

    target
        .reacted_by
        .insert(client.as_str().to_string(), emoji.to_string());
    *target.reactions.entry(emoji.to_string()).or_insert(0) += 1;

    let update = ReactionUpdate {
        reactions: target.reactions.clone(),
        user_reaction: emoji.to_string(),
    };
    save_list(store, &list)?;
    Ok(Some(update))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::StoreFixture;
    use crate::store::memory::InMemoryStore;

    fn client(tag: &str) -> ClientId {
        ClientId::from_string(tag.to_string())
    }

    #[test]
    fn messages_list_newest_first() {
        let mut store = InMemoryStore::new();
        add_message(&mut store, Some("Ana".into()), "first".into()).unwrap();
        add_message(&mut store, None, "second".into()).unwrap();

        let list = list_messages(&store);
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].text, "second");
        assert_eq!(list[0].name, "Guest");
        assert_eq!(list[1].name, "Ana");
    }

    #[test]
    fn deleted_message_stays_gone_and_repeat_delete_is_false() {
        let (fixture, msg) = StoreFixture::new().with_message("Ana", "Congrats!");
        let mut store = fixture.store;

        assert!(delete_message(&mut store, msg.id));
        assert!(list_messages(&store).iter().all(|m| m.id != msg.id));
        assert!(!delete_message(&mut store, msg.id));
        assert!(list_messages(&store).iter().all(|m| m.id != msg.id));
    }

    #[test]
    fn replies_prepend_newest_first() {
        let (fixture, msg) = StoreFixture::new().with_message("Ana", "hello");
        let mut store = fixture.store;

        add_reply(&mut store, msg.id, None, "first".into()).unwrap();
        add_reply(&mut store, msg.id, Some("Bo".into()), "second".into()).unwrap();

        let list = list_messages(&store);
        let replies = &list[0].replies;
        assert_eq!(replies[0].text, "second");
        assert_eq!(replies[0].name, "Bo");
        assert_eq!(replies[1].text, "first");
    }

    #[test]
    fn reply_to_unknown_message_is_none() {
        let mut store = InMemoryStore::new();
        assert!(add_reply(&mut store, Uuid::new_v4(), None, "x".into()).is_none());
    }

    #[test]
    fn one_active_reaction_per_client_transitions_correctly() {
        let (fixture, msg) = StoreFixture::new().with_message("Ana", "hello");
        let mut store = fixture.store;
        let me = client("me");

        add_reaction(&mut store, msg.id, &me, "❤️").unwrap();
        add_reaction(&mut store, msg.id, &me, "👍").unwrap();
        let update = add_reaction(&mut store, msg.id, &me, "❤️").unwrap();

        assert_eq!(update.reactions.get("❤️"), Some(&1));
        // The abandoned emoji keeps a visible zero entry.
        assert_eq!(update.reactions.get("👍"), Some(&0));
        assert_eq!(update.user_reaction, "❤️");

        let stored = &list_messages(&store)[0];
        assert_eq!(stored.reacted_by.get("me"), Some(&"❤️".to_string()));
    }

    #[test]
    fn repeating_the_same_emoji_does_not_toggle_it_off() {
        let (fixture, msg) = StoreFixture::new().with_message("Ana", "hello");
        let mut store = fixture.store;
        let me = client("me");

        add_reaction(&mut store, msg.id, &me, "🎉").unwrap();
        let update = add_reaction(&mut store, msg.id, &me, "🎉").unwrap();

        assert_eq!(update.reactions.get("🎉"), Some(&1));
        assert_eq!(update.user_reaction, "🎉");
    }

    #[test]
    fn reactions_count_distinct_clients() {
        let (fixture, msg) = StoreFixture::new().with_message("Ana", "hello");
        let mut store = fixture.store;

        add_reaction(&mut store, msg.id, &client("a"), "❤️").unwrap();
        add_reaction(&mut store, msg.id, &client("b"), "❤️").unwrap();
        let update = add_reaction(&mut store, msg.id, &client("c"), "👍").unwrap();

        assert_eq!(update.reactions.get("❤️"), Some(&2));
        assert_eq!(update.reactions.get("👍"), Some(&1));
    }

    #[test]
    fn reaction_on_unknown_message_is_none() {
        let mut store = InMemoryStore::new();
        assert!(add_reaction(&mut store, Uuid::new_v4(), &client("me"), "❤️").is_none());
    }
}
