#![allow(
    clippy::unwrap_used,
    reason = "Do not need additional syntax for setting up tests, and https://github.com/rust-lang/rust-clippy/issues/13981"
)]

//! Integration tests for the single-resource endpoints of the HTTP clients.

pub mod common;

mod client {
    use httpmock::{
        Method::{GET, POST},
        MockServer,
    };
    use pterodactyl_client_sdk::Client;
    use pterodactyl_client_sdk::error::{Kind, Status};
    use pterodactyl_client_sdk::types::{ExposeSecret as _, PowerSignal};
    use reqwest::StatusCode;
    use serde_json::{Value, json};

    use crate::common::{API_KEY, BEARER, SERVER_ID, TOKEN};

    #[tokio::test]
    async fn websocket_credentials_should_succeed() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = Client::new(&server.base_url(), API_KEY)?;

        let mock = server.mock(|when, then| {
            when.method(GET)
                .path(format!("/api/client/servers/{SERVER_ID}/websocket"))
                .header("authorization", BEARER)
                .header("accept", "application/json");
            then.status(StatusCode::OK).json_body(json!({
                "data": {
                    "token": TOKEN,
                    "socket": "wss://node.example.com:8080/api/servers/8d9a9a58/ws"
                }
            }));
        });

        let credentials = client.websocket_credentials(SERVER_ID).await?;

        assert_eq!(credentials.token.expose_secret(), TOKEN);
        assert_eq!(
            credentials.socket,
            "wss://node.example.com:8080/api/servers/8d9a9a58/ws"
        );
        mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn send_power_action_should_post_signal() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = Client::new(&server.base_url(), API_KEY)?;

        let mock = server.mock(|when, then| {
            when.method(POST)
                .path(format!("/api/client/servers/{SERVER_ID}/power"))
                .header("content-type", "application/json")
                .json_body(json!({ "signal": "restart" }));
            then.status(StatusCode::NO_CONTENT);
        });

        let response = client
            .send_power_action(SERVER_ID, PowerSignal::Restart)
            .await?;

        assert_eq!(response, Value::Null);
        mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn send_console_command_should_post_command() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = Client::new(&server.base_url(), API_KEY)?;

        let mock = server.mock(|when, then| {
            when.method(POST)
                .path(format!("/api/client/servers/{SERVER_ID}/command"))
                .json_body(json!({ "command": "say hello" }));
            then.status(StatusCode::NO_CONTENT);
        });

        client.send_console_command(SERVER_ID, "say hello").await?;
        mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn non_success_status_should_fail() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = Client::new(&server.base_url(), API_KEY)?;

        let mock = server.mock(|when, then| {
            when.method(POST)
                .path(format!("/api/client/servers/{SERVER_ID}/command"));
            then.status(StatusCode::BAD_GATEWAY)
                .body(r#"{"errors":[{"code":"HttpException","detail":"Server must be online"}]}"#);
        });

        let err = client
            .send_console_command(SERVER_ID, "list")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Kind::Status);
        let status = err.downcast_ref::<Status>().unwrap();
        assert_eq!(status.status_code, StatusCode::BAD_GATEWAY);
        assert_eq!(status.path, format!("/api/client/servers/{SERVER_ID}/command"));
        assert!(status.message.contains("Server must be online"));
        mock.assert();

        Ok(())
    }

    #[test]
    fn invalid_host_should_fail() {
        let err = Client::new("not a url", API_KEY).unwrap_err();

        assert_eq!(err.kind(), Kind::Internal);
    }

    #[test]
    fn host_is_kept() -> anyhow::Result<()> {
        let client = Client::new("https://panel.example.com", API_KEY)?;

        assert_eq!(client.host().as_str(), "https://panel.example.com/");

        Ok(())
    }
}

#[cfg(feature = "blocking")]
mod blocking {
    use httpmock::{
        Method::{GET, POST},
        MockServer,
    };
    use pterodactyl_client_sdk::blocking::Client;
    use pterodactyl_client_sdk::error::Kind;
    use pterodactyl_client_sdk::types::{ExposeSecret as _, PowerSignal};
    use reqwest::StatusCode;
    use serde_json::json;

    use crate::common::{API_KEY, BEARER, SERVER_ID, TOKEN};

    #[test]
    fn websocket_credentials_should_succeed() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = Client::new(&server.base_url(), API_KEY)?;

        let mock = server.mock(|when, then| {
            when.method(GET)
                .path(format!("/api/client/servers/{SERVER_ID}/websocket"))
                .header("authorization", BEARER);
            then.status(StatusCode::OK).json_body(json!({
                "data": { "token": TOKEN, "socket": "wss://node.example.com:8080/ws" }
            }));
        });

        let credentials = client.websocket_credentials(SERVER_ID)?;

        assert_eq!(credentials.token.expose_secret(), TOKEN);
        mock.assert();

        Ok(())
    }

    #[test]
    fn send_power_action_should_post_signal() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = Client::new(&server.base_url(), API_KEY)?;

        let mock = server.mock(|when, then| {
            when.method(POST)
                .path(format!("/api/client/servers/{SERVER_ID}/power"))
                .json_body(json!({ "signal": "kill" }));
            then.status(StatusCode::NO_CONTENT);
        });

        client.send_power_action(SERVER_ID, "kill".parse::<PowerSignal>()?)?;
        mock.assert();

        Ok(())
    }

    #[test]
    fn not_found_should_fail() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = Client::new(&server.base_url(), API_KEY)?;

        server.mock(|when, then| {
            when.method(GET)
                .path(format!("/api/client/servers/{SERVER_ID}/websocket"));
            then.status(StatusCode::NOT_FOUND);
        });

        let err = client.websocket_credentials(SERVER_ID).unwrap_err();

        assert_eq!(err.kind(), Kind::Status);
        assert_eq!(err.status_code(), Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
