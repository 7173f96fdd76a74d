use crate::constants::{MAX_PAGE_SIZE, MIN_PAGE_SIZE};
use crate::error::HttpError;
use crate::session::session::SessionContext;
use crate::transport::http_client::RequestDispatcher;
use crate::transport::model::{PagedEnvelope, PagedQuery};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;

/// Clamps a requested page size into the vendor-enforced window.
fn clamp_page_size(page_size: u32) -> u32 {
    page_size.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE)
}

/// Cursor-paged access to edge/node endpoints, on top of a dispatcher.
pub struct PaginatedFetcher<T: RequestDispatcher> {
    client: Arc<T>,
    context: Arc<SessionContext>,
}

impl<T: RequestDispatcher> PaginatedFetcher<T> {
    pub fn new(client: Arc<T>, context: Arc<SessionContext>) -> Self {
        Self { client, context }
    }

    /// Fetches a single page. `cursor` of `None` starts the sequence.
    pub async fn fetch_page(
        &self,
        query: &PagedQuery,
        cursor: Option<&str>,
        page_size: u32,
    ) -> Result<PagedEnvelope, HttpError> {
        let size = clamp_page_size(page_size);
        let request = query.page_request(cursor, size);
        let response = self.client.execute(&self.context, request).await?;
        let body = response.value()?;
        let envelope = PagedEnvelope::from_response(&body, query.edge_path)?;
        debug!(
            "Fetched page: {} items, has_next_page={}",
            envelope.items.len(),
            envelope.page_info.has_next_page
        );
        Ok(envelope)
    }

    /// Lazy forward-only walk over every node of the query, up to
    /// `ceiling` items when one is given. Restart by calling `iterate`
    /// again; there is no resume from an arbitrary offset.
    pub fn iterate(&self, query: PagedQuery, page_size: u32, ceiling: Option<usize>) -> NodeStream<T> {
        NodeStream {
            client: Arc::clone(&self.client),
            context: Arc::clone(&self.context),
            query,
            page_size: clamp_page_size(page_size),
            ceiling,
            yielded: 0,
            buffer: VecDeque::new(),
            cursor: None,
            exhausted: false,
        }
    }
}

/// Forward-only node sequence. Pulls pages on demand, feeding each
/// `end_cursor` into the next fetch; a short first page does not end the
/// walk as long as the vendor reports more pages.
pub struct NodeStream<T: RequestDispatcher> {
    client: Arc<T>,
    context: Arc<SessionContext>,
    query: PagedQuery,
    page_size: u32,
    ceiling: Option<usize>,
    yielded: usize,
    buffer: VecDeque<Value>,
    cursor: Option<String>,
    exhausted: bool,
}

impl<T: RequestDispatcher> NodeStream<T> {
    pub async fn next(&mut self) -> Result<Option<Value>, HttpError> {
        if let Some(ceiling) = self.ceiling {
            if self.yielded >= ceiling {
                return Ok(None);
            }
        }

        while self.buffer.is_empty() {
            if self.exhausted {
                return Ok(None);
            }
            let fetcher = PaginatedFetcher {
                client: Arc::clone(&self.client),
                context: Arc::clone(&self.context),
            };
            let envelope = fetcher
                .fetch_page(&self.query, self.cursor.as_deref(), self.page_size)
                .await?;
            self.cursor = envelope.page_info.end_cursor.clone();
            self.exhausted = !envelope.page_info.has_next_page;
            self.buffer.extend(envelope.items);
        }

        self.yielded += 1;
        Ok(self.buffer.pop_front())
    }

    /// Drains the remaining sequence into a vector.
    pub async fn collect_nodes(mut self) -> Result<Vec<Value>, HttpError> {
        let mut nodes = match self.ceiling {
            Some(ceiling) => Vec::with_capacity(ceiling.min(4096)),
            None => Vec::new(),
        };
        while let Some(node) = self.next().await? {
            nodes.push(node);
        }
        Ok(nodes)
    }
}

#[cfg(test)]
mod tests_pagination {
    use super::*;
    use crate::config::Config;
    use crate::transport::http_client::InstagramHttpClient;
    use crate::utils::logger::setup_logger;
    use mockito::{Matcher, Server, ServerGuard};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn fetcher_for(server: &ServerGuard) -> PaginatedFetcher<InstagramHttpClient> {
        let mut config = Config::with_credentials("test_user", "test_password");
        config.rest_api.base_url = server.url();
        let client = Arc::new(InstagramHttpClient::new(&config).unwrap());
        let context = Arc::new(SessionContext::anonymous("test_user", "en-US"));
        PaginatedFetcher::new(client, context)
    }

    fn page_body(names: &[&str], has_next: bool, end_cursor: Option<&str>) -> String {
        json!({
            "data": { "user": { "edge_followed_by": {
                "count": 5,
                "page_info": { "has_next_page": has_next, "end_cursor": end_cursor },
                "edges": names.iter().map(|n| json!({ "node": { "username": n } })).collect::<Vec<_>>()
            }}}
        })
        .to_string()
    }

    /// Variables exactly as `PagedQuery::followers("1").page_request`
    /// serializes them (serde_json orders keys, so the string is stable).
    fn followers_vars(after: Option<&str>, first: u32) -> String {
        let mut variables = json!({ "id": "1", "include_reel": true, "fetch_mutual": false });
        let map = variables.as_object_mut().unwrap();
        map.insert("first".to_string(), json!(first));
        if let Some(cursor) = after {
            map.insert("after".to_string(), json!(cursor));
        }
        variables.to_string()
    }

    fn mock_page(
        server: &mut ServerGuard,
        after: Option<&str>,
        body: String,
        hits: usize,
    ) -> mockito::Mock {
        server
            .mock("GET", "/graphql/query/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded(
                    "query_hash".into(),
                    crate::constants::FOLLOWERS_QUERY_HASH.into(),
                ),
                Matcher::UrlEncoded("variables".into(), followers_vars(after, 12)),
            ]))
            .with_status(200)
            .with_body(body)
            .expect(hits)
            .create()
    }

    fn mock_seed(server: &mut ServerGuard) -> mockito::Mock {
        server
            .mock("GET", "/")
            .with_status(200)
            .with_body(r#"{"rollout_hash":"seed-1"}"#)
            .create()
    }

    #[tokio::test]
    async fn test_fetch_page_clamps_page_size() {
        setup_logger();
        let mut server = Server::new_async().await;
        let _seed = mock_seed(&mut server);
        // A request for 3 must hit the wire as the vendor minimum of 12.
        let page = server
            .mock("GET", "/graphql/query/")
            .match_query(Matcher::UrlEncoded(
                "variables".into(),
                followers_vars(None, 12),
            ))
            .with_status(200)
            .with_body(page_body(&["a"], false, None))
            .create();

        let fetcher = fetcher_for(&server);
        let envelope = fetcher
            .fetch_page(&PagedQuery::followers("1"), None, 3)
            .await
            .unwrap();

        assert_eq!(envelope.items.len(), 1);
        page.assert();
    }

    #[tokio::test]
    async fn test_iterate_yields_all_nodes_in_order() {
        setup_logger();
        let mut server = Server::new_async().await;
        let _seed = mock_seed(&mut server);
        let _first = mock_page(
            &mut server,
            None,
            page_body(&["a", "b"], true, Some("CUR1")),
            1,
        );
        let _second = mock_page(
            &mut server,
            Some("CUR1"),
            page_body(&["c", "d"], true, Some("CUR2")),
            1,
        );
        let _third = mock_page(&mut server, Some("CUR2"), page_body(&["e"], false, None), 1);

        let fetcher = fetcher_for(&server);
        let nodes = fetcher
            .iterate(PagedQuery::followers("1"), 12, None)
            .collect_nodes()
            .await
            .unwrap();

        let names: Vec<&str> = nodes.iter().map(|n| n["username"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d", "e"]);
    }

    #[tokio::test]
    async fn test_iterate_stops_at_ceiling() {
        setup_logger();
        let mut server = Server::new_async().await;
        let _seed = mock_seed(&mut server);
        let _first = mock_page(
            &mut server,
            None,
            page_body(&["a", "b", "c"], true, Some("CUR1")),
            1,
        );
        // The second page must never be requested once the ceiling is met.
        let second = mock_page(
            &mut server,
            Some("CUR1"),
            page_body(&["d"], false, None),
            0,
        );

        let fetcher = fetcher_for(&server);
        let nodes = fetcher
            .iterate(PagedQuery::followers("1"), 12, Some(2))
            .collect_nodes()
            .await
            .unwrap();

        assert_eq!(nodes.len(), 2);
        second.assert();
    }

    #[tokio::test]
    async fn test_first_page_underfill_keeps_pulling() {
        setup_logger();
        let mut server = Server::new_async().await;
        let _seed = mock_seed(&mut server);
        // The vendor returns fewer items than requested but reports more
        // pages; iteration must continue to the ceiling.
        let _first = mock_page(&mut server, None, page_body(&["a"], true, Some("CUR1")), 1);
        let _second = mock_page(
            &mut server,
            Some("CUR1"),
            page_body(&["b"], true, Some("CUR2")),
            1,
        );
        let _third = mock_page(&mut server, Some("CUR2"), page_body(&["c"], false, None), 1);

        let fetcher = fetcher_for(&server);
        let nodes = fetcher
            .iterate(PagedQuery::followers("1"), 12, Some(3))
            .collect_nodes()
            .await
            .unwrap();

        assert_eq!(nodes.len(), 3);
    }

    #[tokio::test]
    async fn test_empty_page_with_next_flag_continues() {
        setup_logger();
        let mut server = Server::new_async().await;
        let _seed = mock_seed(&mut server);
        let _first = mock_page(&mut server, None, page_body(&[], true, Some("CUR1")), 1);
        let _second = mock_page(&mut server, Some("CUR1"), page_body(&["z"], false, None), 1);

        let fetcher = fetcher_for(&server);
        let nodes = fetcher
            .iterate(PagedQuery::followers("1"), 12, None)
            .collect_nodes()
            .await
            .unwrap();

        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0]["username"], "z");
    }

    #[test]
    fn test_clamp_bounds() {
        assert_eq!(clamp_page_size(1), 12);
        assert_eq!(clamp_page_size(12), 12);
        assert_eq!(clamp_page_size(30), 30);
        assert_eq!(clamp_page_size(50), 50);
        assert_eq!(clamp_page_size(500), 50);
    }
}
