#![allow(
    clippy::unwrap_used,
    reason = "Do not need additional syntax for setting up tests, and https://github.com/rust-lang/rust-clippy/issues/13981"
)]

//! Integration tests for paginated list endpoints.
//!
//! Every test serves pages from `httpmock` and checks both what the collection yields and how
//! many requests it issued to get there.

pub mod common;

mod collection {
    use futures_util::StreamExt as _;
    use httpmock::{Method::GET, MockServer};
    use pterodactyl_client_sdk::Client;
    use pterodactyl_client_sdk::error::Kind;
    use pterodactyl_client_sdk::pagination::CursorState;
    use pterodactyl_client_sdk::types::ListRequest;
    use reqwest::StatusCode;
    use serde_json::json;
    use tokio::pin;

    use crate::common::{API_KEY, BEARER, identifiers, next_link, page};

    #[tokio::test]
    async fn collect_all_concatenates_two_pages() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = Client::new(&server.base_url(), API_KEY)?;

        let first = server.mock(|when, then| {
            when.method(GET)
                .path("/api/client")
                .query_param_missing("page")
                .header("authorization", BEARER);
            then.status(StatusCode::OK).json_body(json!({
                "data": [{ "id": 1 }],
                "meta": { "pagination": { "total": 2, "links": { "next": "http://x?page=2" } } }
            }));
        });
        let second = server.mock(|when, then| {
            when.method(GET).path("/api/client").query_param("page", "2");
            then.status(StatusCode::OK).json_body(json!({
                "data": [{ "id": 2 }],
                "meta": { "pagination": { "total": 2, "links": { "next": "" } } }
            }));
        });

        let mut servers = client.list_servers(&ListRequest::default()).await?;
        assert_eq!(servers.item_count(), Some(2));

        let items = servers.collect_all().await?;

        assert_eq!(items, vec![json!({ "id": 1 }), json!({ "id": 2 })]);
        first.assert_calls(1);
        second.assert_calls(1);

        Ok(())
    }

    #[tokio::test]
    async fn n_pages_take_n_minus_one_fetches() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = Client::new(&server.base_url(), API_KEY)?;
        let pages = 4_u64;
        let total = pages * 2;

        let first = server.mock(|when, then| {
            when.method(GET)
                .path("/api/application/users")
                .query_param_missing("page");
            then.status(StatusCode::OK).json_body(page(
                &[1, 2],
                1,
                total,
                Some(next_link(&server, "application/users", 2)),
            ));
        });
        let mut followers = Vec::new();
        for n in 2..=pages {
            let next = (n < pages).then(|| next_link(&server, "application/users", n + 1));
            followers.push(server.mock(|when, then| {
                when.method(GET)
                    .path("/api/application/users")
                    .query_param("page", n.to_string());
                then.status(StatusCode::OK)
                    .json_body(page(&[n * 2 - 1, n * 2], n, total, next));
            }));
        }

        let mut users = client.list_users(&ListRequest::default()).await?;
        let items = users.collect_all().await?;

        assert_eq!(identifiers(&items), (1..=total).collect::<Vec<_>>());
        assert_eq!(users.page_requests(), pages - 1);
        assert_eq!(users.state(), CursorState::Exhausted);
        first.assert_calls(1);
        for mock in &followers {
            mock.assert_calls(1);
        }

        Ok(())
    }

    #[tokio::test]
    async fn exhausted_collection_does_not_refetch() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = Client::new(&server.base_url(), API_KEY)?;

        let first = server.mock(|when, then| {
            when.method(GET).path("/api/client").query_param_missing("page");
            then.status(StatusCode::OK)
                .json_body(page(&[1, 2], 1, 3, Some(next_link(&server, "client", 2))));
        });
        let second = server.mock(|when, then| {
            when.method(GET).path("/api/client").query_param("page", "2");
            then.status(StatusCode::OK).json_body(page(&[3], 2, 3, None));
        });

        let mut servers = client.list_servers(&ListRequest::default()).await?;
        assert_eq!(servers.collect_all().await?.len(), 3);

        assert!(servers.advance().await?.is_none());
        assert!(servers.collect_all().await?.is_empty());
        let items = servers.items();
        pin!(items);
        assert!(items.next().await.is_none());

        first.assert_calls(1);
        second.assert_calls(1);

        Ok(())
    }

    #[tokio::test]
    async fn includes_are_sent_with_every_page() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = Client::new(&server.base_url(), API_KEY)?;

        let first = server.mock(|when, then| {
            when.method(GET)
                .path("/api/application/servers")
                .query_param("include", "egg,allocations")
                .query_param("per_page", "2")
                .query_param_missing("page");
            then.status(StatusCode::OK).json_body(page(
                &[1, 2],
                1,
                3,
                Some(next_link(&server, "application/servers", 2)),
            ));
        });
        let second = server.mock(|when, then| {
            when.method(GET)
                .path("/api/application/servers")
                .query_param("include", "egg,allocations")
                .query_param("per_page", "2")
                .query_param("page", "2");
            then.status(StatusCode::OK).json_body(page(&[3], 2, 3, None));
        });

        let request = ListRequest::builder()
            .include(vec!["egg".to_owned(), "allocations".to_owned()])
            .per_page(2)
            .build();
        let mut servers = client.list_application_servers(&request).await?;

        let pages = servers.pages();
        pin!(pages);
        let mut sizes = Vec::new();
        while let Some(page) = pages.next().await {
            sizes.push(page?.len());
        }

        assert_eq!(sizes, vec![2, 1]);
        first.assert();
        second.assert();

        Ok(())
    }

    #[tokio::test]
    async fn failed_page_fetch_can_be_retried() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = Client::new(&server.base_url(), API_KEY)?;

        server.mock(|when, then| {
            when.method(GET).path("/api/client").query_param_missing("page");
            then.status(StatusCode::OK)
                .json_body(page(&[1, 2], 1, 3, Some(next_link(&server, "client", 2))));
        });
        let mut failing = server.mock(|when, then| {
            when.method(GET).path("/api/client").query_param("page", "2");
            then.status(StatusCode::BAD_GATEWAY).body("upstream unavailable");
        });

        let mut servers = client.list_servers(&ListRequest::default()).await?;
        assert_eq!(servers.advance().await?.map(|page| page.len()), Some(2));

        let err = servers.advance().await.unwrap_err();
        assert_eq!(err.kind(), Kind::Status);
        assert_eq!(err.status_code(), Some(StatusCode::BAD_GATEWAY));
        assert_eq!(servers.state(), CursorState::Iterating);
        assert_eq!(servers.current_page(), 1);
        assert_eq!(identifiers(servers.page().items()), vec![1, 2]);

        failing.delete();
        server.mock(|when, then| {
            when.method(GET).path("/api/client").query_param("page", "2");
            then.status(StatusCode::OK).json_body(page(&[3], 2, 3, None));
        });

        let retried = servers.advance().await?.unwrap();
        assert_eq!(identifiers(retried.items()), vec![3]);
        assert!(servers.advance().await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn get_reads_current_page_only() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = Client::new(&server.base_url(), API_KEY)?;

        let first = server.mock(|when, then| {
            when.method(GET).path("/api/client");
            then.status(StatusCode::OK)
                .json_body(page(&[7, 8], 1, 4, Some(next_link(&server, "client", 2))));
        });

        let servers = client.list_servers(&ListRequest::default()).await?;

        assert_eq!(servers.get(1)?["attributes"]["internal_id"], 8);
        assert_eq!(servers.get(2).unwrap_err().kind(), Kind::Validation);
        assert_eq!(
            servers.next_page_link(),
            Some(next_link(&server, "client", 2).as_str())
        );
        assert_eq!(servers.previous_page_link(), None);
        first.assert_calls(1);

        Ok(())
    }
}

#[cfg(feature = "blocking")]
mod blocking {
    use httpmock::{Method::GET, MockServer};
    use pterodactyl_client_sdk::blocking::Client;
    use pterodactyl_client_sdk::pagination::CursorState;
    use pterodactyl_client_sdk::types::ListRequest;
    use reqwest::StatusCode;

    use crate::common::{API_KEY, BEARER, identifiers, next_link, page};

    #[test]
    fn for_loop_walks_every_page() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = Client::new(&server.base_url(), API_KEY)?;

        let first = server.mock(|when, then| {
            when.method(GET)
                .path("/api/client")
                .query_param_missing("page")
                .header("authorization", BEARER);
            then.status(StatusCode::OK)
                .json_body(page(&[1, 2], 1, 3, Some(next_link(&server, "client", 2))));
        });
        let second = server.mock(|when, then| {
            when.method(GET).path("/api/client").query_param("page", "2");
            then.status(StatusCode::OK).json_body(page(&[3], 2, 3, None));
        });

        let mut servers = client.list_servers(&ListRequest::default())?;
        let mut seen = Vec::new();
        for page in &mut servers {
            seen.extend(identifiers(page?.items()));
        }

        assert_eq!(seen, vec![1, 2, 3]);
        assert_eq!(servers.state(), CursorState::Exhausted);
        assert!(servers.collect_all()?.is_empty());
        first.assert_calls(1);
        second.assert_calls(1);

        Ok(())
    }

    #[test]
    fn collect_all_drains_remaining_pages() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = Client::new(&server.base_url(), API_KEY)?;

        server.mock(|when, then| {
            when.method(GET)
                .path("/api/application/users")
                .query_param_missing("page");
            then.status(StatusCode::OK).json_body(page(
                &[1, 2],
                1,
                4,
                Some(next_link(&server, "application/users", 2)),
            ));
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/application/users")
                .query_param("page", "2");
            then.status(StatusCode::OK).json_body(page(&[3, 4], 2, 4, None));
        });

        let mut users = client.list_users(&ListRequest::default())?;
        users.advance()?;

        let rest = users.collect_all()?;

        assert_eq!(identifiers(&rest), vec![3, 4]);
        assert_eq!(users.page_requests(), 1);

        Ok(())
    }
}
