//! Command handlers module for the chat relay.
//!
//! Each handler runs on the issuing session's read side. Replies to the
//! issuer go straight onto its own outbound queue; anything that touches the
//! registry or other sessions is a router request.

use log::debug;

use crate::client::ClientSession;
use crate::error::{RegistryError, SessionError};
use crate::protocol::responses;
use crate::protocol::{Command, Input};
use crate::router::{Message, RouterHandle};
use crate::utils::is_valid_handle;

/// Dispatches one parsed line of input.
///
/// Protocol and registry errors are reported to the session and return
/// `Ok`; an `Err` means the session itself can no longer continue.
pub async fn handle_input(
    session: &mut ClientSession,
    input: Input,
    router: &RouterHandle,
) -> Result<(), SessionError> {
    match input {
        Input::Blank => Ok(()),
        Input::Chat(text) => handle_chat(session, text, router).await,
        Input::Command(command) => handle_command(session, command, router).await,
    }
}

/// Dispatches a received command to its corresponding handler.
pub async fn handle_command(
    session: &mut ClientSession,
    command: Command,
    router: &RouterHandle,
) -> Result<(), SessionError> {
    match command {
        Command::Nick(args) => handle_cmd_nick(session, &args, router).await,
        Command::Send(args) => handle_cmd_send(session, &args, router).await,
        Command::Bcast(args) => handle_cmd_bcast(session, &args, router).await,
        Command::List => handle_cmd_list(session, router).await,
        Command::Unknown(word) => handle_cmd_unknown(session, &word).await,
    }
}

/// Plain chat: broadcast when registered, rejected otherwise.
async fn handle_chat(
    session: &ClientSession,
    text: String,
    router: &RouterHandle,
) -> Result<(), SessionError> {
    let Some(from) = session.handle() else {
        return session.reply(responses::COMMAND_REQUIRED).await;
    };

    router.route(Message::broadcast(from, text)).await?;
    Ok(())
}

/// Handles NICK: validates the first argument token and asks the router to
/// claim it, replacing the session's current handle if it has one.
async fn handle_cmd_nick(
    session: &mut ClientSession,
    args: &str,
    router: &RouterHandle,
) -> Result<(), SessionError> {
    let Some(candidate) = args.split_whitespace().next() else {
        return session.reply(responses::NICK_USAGE).await;
    };

    if !is_valid_handle(candidate) {
        return session.reply(responses::NICK_INVALID).await;
    }

    let claim = router
        .register(session.id(), candidate, session.handle(), session.outbound())
        .await?;

    match claim {
        Ok(()) => {
            session.set_handle(Some(candidate.to_string()));
            session.reply(responses::nick_set(candidate)).await
        }
        Err(RegistryError::HandleInUse(_)) => session.reply(responses::NICK_IN_USE).await,
    }
}

/// Handles SEND: one directed message per `;`-separated recipient, each
/// followed by a confirmation that it was handed to the router.
async fn handle_cmd_send(
    session: &ClientSession,
    args: &str,
    router: &RouterHandle,
) -> Result<(), SessionError> {
    let Some(from) = session.handle() else {
        return session.reply(responses::SEND_NEEDS_NICK).await;
    };

    let fields: Vec<&str> = args.split_whitespace().collect();
    if fields.len() < 2 {
        return session.reply(responses::SEND_USAGE).await;
    }

    let content = fields[1..].join(" ");
    let recipients = fields[0]
        .split(';')
        .map(str::trim)
        .filter(|r| !r.is_empty());

    for recipient in recipients {
        router
            .route(Message::directed(from, recipient, content.as_str()))
            .await?;
        session.reply(responses::message_sent(recipient)).await?;
    }

    Ok(())
}

/// Handles BCAST: broadcasts the whole remainder.
async fn handle_cmd_bcast(
    session: &ClientSession,
    args: &str,
    router: &RouterHandle,
) -> Result<(), SessionError> {
    let Some(from) = session.handle() else {
        return session.reply(responses::BCAST_NEEDS_NICK).await;
    };

    let content = args.trim();
    if content.is_empty() {
        return session.reply(responses::BCAST_USAGE).await;
    }

    router.route(Message::broadcast(from, content)).await?;
    session.reply(responses::BCAST_SENT).await
}

/// Handles LIST: available with or without a handle.
async fn handle_cmd_list(
    session: &ClientSession,
    router: &RouterHandle,
) -> Result<(), SessionError> {
    let mut handles = router.list().await?;
    if handles.is_empty() {
        return session.reply(responses::NO_USERS).await;
    }

    handles.sort();
    session.reply(responses::user_list(&handles)).await
}

async fn handle_cmd_unknown(session: &ClientSession, word: &str) -> Result<(), SessionError> {
    debug!("Session {} sent unknown command '{}'", session.id(), word);
    session.reply(responses::INVALID_COMMAND).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::parse_input;
    use crate::router::Router;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    struct TestClient {
        session: ClientSession,
        rx: mpsc::Receiver<String>,
    }

    impl TestClient {
        fn new() -> Self {
            let (tx, rx) = mpsc::channel(32);
            let addr = "127.0.0.1:50000".parse().unwrap();
            Self {
                session: ClientSession::new(addr, tx),
                rx,
            }
        }

        async fn send(&mut self, line: &str, router: &RouterHandle) {
            handle_input(&mut self.session, parse_input(line), router)
                .await
                .unwrap();
        }

        async fn next_line(&mut self) -> String {
            timeout(Duration::from_secs(1), self.rx.recv())
                .await
                .expect("timed out waiting for a line")
                .expect("queue closed")
        }

        fn assert_idle(&mut self) {
            assert!(self.rx.try_recv().is_err(), "unexpected line queued");
        }
    }

    async fn registered(handle: &str, router: &RouterHandle) -> TestClient {
        let mut client = TestClient::new();
        client.send(&format!("/NICK {}", handle), router).await;
        assert_eq!(
            client.next_line().await,
            format!("Nickname successfully set to {}\n", handle)
        );
        client
    }

    async fn settle(router: &RouterHandle) {
        router.list().await.unwrap();
    }

    #[tokio::test]
    async fn test_blank_line_is_ignored() {
        let router = Router::spawn(16);
        let mut client = TestClient::new();
        client.send("   ", &router).await;
        client.assert_idle();
    }

    #[tokio::test]
    async fn test_chat_requires_nick() {
        let router = Router::spawn(16);
        let mut bob = registered("bob", &router).await;
        let mut anon = TestClient::new();

        anon.send("hello?", &router).await;
        settle(&router).await;

        assert_eq!(anon.next_line().await, "Error: A command must be specified\n");
        bob.assert_idle();
    }

    #[tokio::test]
    async fn test_chat_broadcasts_when_registered() {
        let router = Router::spawn(16);
        let mut alice = registered("alice", &router).await;
        let mut bob = registered("bob", &router).await;

        alice.send("  good morning  ", &router).await;
        assert_eq!(bob.next_line().await, "[alice]: good morning\n");
        settle(&router).await;
        alice.assert_idle();
    }

    #[tokio::test]
    async fn test_nick_errors() {
        let router = Router::spawn(16);
        let _alice = registered("alice", &router).await;
        let mut client = TestClient::new();

        client.send("/NICK", &router).await;
        assert_eq!(client.next_line().await, "Usage: /NICK <name>\n");

        client.send("/NICK 9lives", &router).await;
        assert!(client.next_line().await.starts_with("Invalid nickname."));

        client.send("/NICK abcdefghijk", &router).await;
        assert!(client.next_line().await.starts_with("Invalid nickname."));

        client.send("/N alice", &router).await;
        assert_eq!(client.next_line().await, "Error: Nickname is already in use!\n");
        assert_eq!(client.session.handle(), None);
    }

    #[tokio::test]
    async fn test_nick_uses_first_token() {
        let router = Router::spawn(16);
        let mut client = TestClient::new();

        client.send("/nick carol extra words", &router).await;
        assert_eq!(client.next_line().await, "Nickname successfully set to carol\n");
        assert_eq!(router.list().await.unwrap(), vec!["carol"]);
    }

    #[tokio::test]
    async fn test_rename_releases_old_handle() {
        let router = Router::spawn(16);
        let mut alice = registered("alice", &router).await;

        alice.send("/NICK alicia", &router).await;
        assert_eq!(alice.next_line().await, "Nickname successfully set to alicia\n");
        assert_eq!(alice.session.handle(), Some("alicia"));
        assert_eq!(router.list().await.unwrap(), vec!["alicia"]);

        // the old handle is free for someone else
        let _other = registered("alice", &router).await;
    }

    #[tokio::test]
    async fn test_renaming_to_own_handle_is_in_use() {
        let router = Router::spawn(16);
        let mut alice = registered("alice", &router).await;

        alice.send("/NICK alice", &router).await;
        assert_eq!(alice.next_line().await, "Error: Nickname is already in use!\n");
        assert_eq!(router.list().await.unwrap(), vec!["alice"]);
    }

    #[tokio::test]
    async fn test_send_requires_nick_and_arguments() {
        let router = Router::spawn(16);
        let mut anon = TestClient::new();
        anon.send("/SEND bob hi", &router).await;
        assert_eq!(
            anon.next_line().await,
            "You must set a nickname before using /SEND.\n"
        );

        let mut alice = registered("alice", &router).await;
        alice.send("/SEND bob", &router).await;
        assert_eq!(
            alice.next_line().await,
            "Invalid format. Usage: /SEND <nickname(s)> <message>\n"
        );
    }

    #[tokio::test]
    async fn test_send_to_registered_recipient() {
        let router = Router::spawn(16);
        let mut alice = registered("alice", &router).await;
        let mut bob = registered("bob", &router).await;
        let mut carol = registered("carol", &router).await;

        alice.send("/S bob   see   you  later", &router).await;
        assert_eq!(alice.next_line().await, "Message sent to bob\n");
        assert_eq!(bob.next_line().await, "[alice]: see you later\n");

        settle(&router).await;
        alice.assert_idle();
        carol.assert_idle();
    }

    #[tokio::test]
    async fn test_send_confirmations_follow_recipient_order() {
        let router = Router::spawn(16);
        let mut sender = registered("zed", &router).await;
        let mut a = registered("a", &router).await;
        let mut b = registered("b", &router).await;
        let mut c = registered("c", &router).await;

        sender.send("/SEND a;;b;c hello", &router).await;

        assert_eq!(sender.next_line().await, "Message sent to a\n");
        assert_eq!(sender.next_line().await, "Message sent to b\n");
        assert_eq!(sender.next_line().await, "Message sent to c\n");
        for peer in [&mut a, &mut b, &mut c] {
            assert_eq!(peer.next_line().await, "[zed]: hello\n");
        }
    }

    #[tokio::test]
    async fn test_send_to_unregistered_recipient() {
        let router = Router::spawn(16);
        let mut alice = registered("alice", &router).await;
        let mut bob = registered("bob", &router).await;

        alice.send("/SEND bob;carol hey", &router).await;
        settle(&router).await;

        let lines = vec![
            alice.next_line().await,
            alice.next_line().await,
            alice.next_line().await,
        ];
        let position = |text: &str| lines.iter().position(|l| l == text).unwrap();
        assert_eq!(position("Message sent to bob\n"), 0);
        assert!(lines.contains(&"Message sent to carol\n".to_string()));
        assert!(position("Error: carol is not registered.\n") > position("Message sent to bob\n"));
        alice.assert_idle();

        assert_eq!(bob.next_line().await, "[alice]: hey\n");
        bob.assert_idle();
    }

    #[tokio::test]
    async fn test_cancelled_nick_is_released_by_session_unregister() {
        // router not running yet, so the claim is queued but never answered
        let (router_actor, router) = Router::new(8);
        let mut client = TestClient::new();

        let pending = handle_input(&mut client.session, parse_input("/NICK ghost"), &router);
        assert!(timeout(Duration::from_millis(20), pending).await.is_err());
        assert_eq!(client.session.handle(), None);

        let session = client.session.id();
        drop(client);
        tokio::spawn(router_actor.run());

        router.unregister(session).await.unwrap();
        assert!(router.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bcast() {
        let router = Router::spawn(16);
        let mut anon = TestClient::new();
        anon.send("/BCAST hi", &router).await;
        assert_eq!(
            anon.next_line().await,
            "You must set a nickname before using /BCAST.\n"
        );

        let mut alice = registered("alice", &router).await;
        let mut bob = registered("bob", &router).await;

        alice.send("/B   ", &router).await;
        assert_eq!(alice.next_line().await, "Usage: /BCAST <message>\n");

        alice.send("/BCAST hi", &router).await;
        assert_eq!(alice.next_line().await, "Broadcast message sent.\n");
        assert_eq!(bob.next_line().await, "[alice]: hi\n");

        settle(&router).await;
        alice.assert_idle();
    }

    #[tokio::test]
    async fn test_list() {
        let router = Router::spawn(16);
        let mut anon = TestClient::new();

        anon.send("/LIST", &router).await;
        assert_eq!(anon.next_line().await, "No users currently connected.\n");

        let _bob = registered("bob", &router).await;
        let _alice = registered("alice", &router).await;

        anon.send("/l", &router).await;
        assert_eq!(anon.next_line().await, "Connected users: alice, bob\n");
    }

    #[tokio::test]
    async fn test_unknown_command_replies_only_to_issuer() {
        let router = Router::spawn(16);
        let mut alice = registered("alice", &router).await;
        let mut bob = registered("bob", &router).await;

        alice.send("/WHOIS bob", &router).await;
        let reply = alice.next_line().await;
        assert!(reply.starts_with("ERROR: Invalid command."));
        assert!(reply.contains("/SEND or /S <nickname(s)> <message>"));

        settle(&router).await;
        bob.assert_idle();
    }
}
