//! End-to-end command scenarios: a text message goes into the registry, the
//! node is a wiremock server and Discord is a mock gateway.

use std::sync::Arc;

use cadence::gateway::{Gateway, GatewayError};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use serenity::all::{ChannelId, CreateMessage, GuildId};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::fixtures::{self, SAMPLE_CHANNEL_ID, SAMPLE_GUILD_ID, SAMPLE_VOICE_CHANNEL_ID};
use crate::common::mocks::{MockDiscordGateway, voice_connection};
use crate::common::registry_for;

fn rendered(message: &CreateMessage) -> Value {
    serde_json::to_value(message).expect("message serializes")
}

fn in_voice(gateway: &mut MockDiscordGateway) {
    gateway
        .expect_voice_channel()
        .returning(|_, _| Some(ChannelId::new(SAMPLE_VOICE_CHANNEL_ID)));
}

#[tokio::test]
async fn test_play_starts_track_when_idle() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(fixtures::players_path()))
        .and(body_partial_json(json!({"voice": {"sessionId": "voice-session"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::player(None)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v4/loadtracks"))
        .and(query_param("identifier", "ytsearch:lofi beats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "loadType": "search",
            "data": [
                fixtures::track("jfKfPfyJRdk", "lofi hip hop radio"),
                fixtures::track("x", "Other")
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(fixtures::players_path()))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(fixtures::players_path()))
        .and(body_partial_json(json!({
            "track": {
                "encoded": "jfKfPfyJRdk",
                "userData": {
                    "requesterId": fixtures::SAMPLE_USER_ID.to_string(),
                    "requesterName": "ferris"
                }
            }
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut gateway = MockDiscordGateway::new();
    in_voice(&mut gateway);
    gateway
        .expect_join_voice()
        .withf(|guild, channel| {
            *guild == GuildId::new(SAMPLE_GUILD_ID)
                && *channel == ChannelId::new(SAMPLE_VOICE_CHANNEL_ID)
        })
        .times(1)
        .returning(|_, _| Ok(voice_connection()));
    gateway
        .expect_send_message()
        .withf(|channel, message| {
            let embed = &rendered(message)["embeds"][0];
            *channel == ChannelId::new(SAMPLE_CHANNEL_ID)
                && embed["title"] == json!("lofi hip hop radio")
                && embed["fields"][1]["name"] == json!("Queue Position")
                && embed["fields"][1]["value"] == json!("1")
        })
        .times(1)
        .returning(|_, _| Ok(()));

    let registry = registry_for(&server).await;
    let gateway: Arc<dyn Gateway> = Arc::new(gateway);
    assert!(
        registry
            .dispatch_text(gateway, fixtures::text_message("!play lofi beats"))
            .await
    );
}

#[tokio::test]
async fn test_play_queues_behind_current_track() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(fixtures::players_path()))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v4/loadtracks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "loadType": "track",
            "data": fixtures::track("new", "New Song")
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(fixtures::players_path()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(fixtures::player(Some(fixtures::track("cur", "Current")))),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/queue", fixtures::players_path())))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tracks": [fixtures::track("a", "A")]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{}/queue/tracks", fixtures::players_path())))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut gateway = MockDiscordGateway::new();
    in_voice(&mut gateway);
    gateway
        .expect_join_voice()
        .returning(|_, _| Ok(voice_connection()));
    gateway
        .expect_send_message()
        .withf(|_, message| rendered(message)["embeds"][0]["fields"][1]["value"] == json!("2"))
        .times(1)
        .returning(|_, _| Ok(()));

    let registry = registry_for(&server).await;
    registry
        .dispatch_text(
            Arc::new(gateway),
            fixtures::text_message("!p https://www.youtube.com/watch?v=new"),
        )
        .await;
}

#[tokio::test]
async fn test_skip_at_end_of_queue_reports_end() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{}/queue/next", fixtures::players_path())))
        .and(query_param("count", "1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(fixtures::players_path()))
        .and(body_partial_json(json!({"track": {"encoded": null}})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut gateway = MockDiscordGateway::new();
    gateway
        .expect_send_message()
        .withf(|_, message| {
            rendered(message)["embeds"][0]["description"] == json!("The queue has ended.")
        })
        .times(1)
        .returning(|_, _| Ok(()));

    let registry = registry_for(&server).await;
    registry
        .dispatch_text(Arc::new(gateway), fixtures::text_message("!skip"))
        .await;
}

#[tokio::test]
async fn test_queue_on_idle_guild_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(fixtures::players_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::player(None)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/queue", fixtures::players_path())))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let mut gateway = MockDiscordGateway::new();
    gateway
        .expect_send_message()
        .withf(|_, message| rendered(message)["content"] == json!("The queue is empty."))
        .times(1)
        .returning(|_, _| Ok(()));

    let registry = registry_for(&server).await;
    registry
        .dispatch_text(Arc::new(gateway), fixtures::text_message("!q"))
        .await;
}

#[tokio::test]
async fn test_play_outside_voice_channel() {
    let server = MockServer::start().await;

    let mut gateway = MockDiscordGateway::new();
    gateway.expect_voice_channel().returning(|_, _| None);
    gateway.expect_join_voice().times(0);
    gateway
        .expect_send_message()
        .withf(|_, message| {
            rendered(message)["content"]
                == json!("You need to be in a voice channel to use this command.")
        })
        .times(1)
        .returning(|_, _| Ok(()));

    let registry = registry_for(&server).await;
    registry
        .dispatch_text(Arc::new(gateway), fixtures::text_message("!play lofi beats"))
        .await;

    assert_eq!(server.received_requests().await.unwrap().len(), 0);
}

#[tokio::test]
async fn test_join_failure_names_voice_channel() {
    let server = MockServer::start().await;

    let mut gateway = MockDiscordGateway::new();
    in_voice(&mut gateway);
    gateway
        .expect_join_voice()
        .returning(|_, _| Err(GatewayError::Voice("join timed out".into())));
    gateway
        .expect_send_message()
        .withf(|_, message| {
            rendered(message)["content"]
                == json!("Sorry, I couldn't join your voice channel. Please try again later.")
        })
        .times(1)
        .returning(|_, _| Ok(()));

    let registry = registry_for(&server).await;
    registry
        .dispatch_text(Arc::new(gateway), fixtures::text_message("!tocar lofi"))
        .await;

    assert_eq!(server.received_requests().await.unwrap().len(), 0);
}

#[tokio::test]
async fn test_bot_messages_are_ignored() {
    let server = MockServer::start().await;

    let mut gateway = MockDiscordGateway::new();
    gateway.expect_voice_channel().times(0);
    gateway.expect_send_message().times(0);

    let mut message = fixtures::text_message("!play lofi beats");
    message.author.bot = true;

    let registry = registry_for(&server).await;
    assert!(!registry.dispatch_text(Arc::new(gateway), message).await);
}
