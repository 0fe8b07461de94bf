use prlens_core::{EventKind, GitHubApi, GitHubConfig, PrlensError};
use prlens_review::github::GitHubClient;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, token: Option<&str>) -> GitHubClient {
    let config = GitHubConfig {
        api_base: server.uri(),
        token: token.map(str::to_string),
        ..GitHubConfig::default()
    };
    GitHubClient::new(&config).unwrap()
}

#[tokio::test]
async fn user_events_send_auth_and_decode() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/octocat/events"))
        .and(header("authorization", "Bearer t0k"))
        .and(header("accept", "application/vnd.github+json"))
        .and(header("user-agent", "prlens"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "type": "PullRequestEvent",
                "repo": { "name": "octo/hello" },
                "payload": { "pull_request": { "number": 3, "title": "Add cache" } },
                "created_at": "2024-01-02T03:04:05Z"
            },
            { "type": "WatchEvent", "repo": { "name": "octo/hello" }, "payload": {} }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let events = client_for(&server, Some("t0k"))
        .list_user_events("octocat")
        .await
        .unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].kind, EventKind::PullRequestEvent);
    assert_eq!(events[0].repo_name(), Some("octo/hello"));
    assert_eq!(events[1].kind, EventKind::Other);
}

#[tokio::test]
async fn status_codes_map_to_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/ghost/events"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/busy/events"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/broken/events"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let client = client_for(&server, None);

    let err = client.list_user_events("ghost").await.unwrap_err();
    assert_eq!(err.to_string(), "User ghost not found");

    let err = client.list_user_events("busy").await.unwrap_err();
    assert!(matches!(err, PrlensError::RateLimited));

    let err = client.list_user_events("broken").await.unwrap_err();
    assert!(matches!(err, PrlensError::Http { status: 502, .. }));
}

#[tokio::test]
async fn pull_request_reviews_commits_and_files() {
    let server = MockServer::start().await;
    let commits_url = format!("{}/repos/octo/hello/pulls/7/commits", server.uri());

    Mock::given(method("GET"))
        .and(path("/repos/octo/hello/pulls/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "number": 7,
            "title": "Fix login",
            "body": null,
            "additions": 40,
            "deletions": 2,
            "changed_files": 3,
            "commits_url": commits_url,
            "state": "open"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/hello/pulls/7/reviews"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "state": "APPROVED", "user": { "login": "kim" }, "submitted_at": "2024-02-10T12:00:00Z" },
            { "state": "COMMENTED", "user": null }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/hello/pulls/7/commits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "sha": "a1", "commit": { "message": "fix: login\n\ndetails" } },
            { "sha": "b2", "commit": { "message": "test: cover login" } }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/hello/pulls/7/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "filename": "src/login.rs", "status": "modified" },
            { "filename": "tests/login.rs", "status": "added" }
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server, Some("t0k"));

    let pr = client.get_pull_request("octo/hello", 7).await.unwrap();
    assert_eq!(pr.title.as_deref(), Some("Fix login"));
    assert_eq!(pr.body, None);
    assert_eq!(pr.additions, Some(40));
    assert_eq!(pr.commits_url.as_deref(), Some(commits_url.as_str()));

    let reviews = client
        .list_pull_request_reviews("octo/hello", 7)
        .await
        .unwrap();
    assert_eq!(reviews.len(), 2);
    assert_eq!(reviews[0].reviewer, "kim");
    assert_eq!(reviews[0].date, "2/10/2024");
    assert_eq!(reviews[1].reviewer, "unknown");
    assert_eq!(reviews[1].date, "unknown date");

    let commits = client.list_commits(&commits_url).await.unwrap();
    assert_eq!(commits.len(), 2);
    assert_eq!(commits[0].subject(), "fix: login");

    let files = client.list_changed_files("octo/hello", 7).await.unwrap();
    assert_eq!(files, vec!["src/login.rs", "tests/login.rs"]);
}

#[tokio::test]
async fn missing_pull_request_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/hello/pulls/99"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })))
        .mount(&server)
        .await;

    let err = client_for(&server, None)
        .get_pull_request("octo/hello", 99)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "PR #99 in octo/hello not found");
}

#[tokio::test]
async fn post_comment_creates_review() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/repos/octo/hello/pulls/7/reviews"))
        .and(body_partial_json(json!({ "event": "COMMENT", "body": "## Review" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 1, "state": "COMMENTED" })))
        .expect(1)
        .mount(&server)
        .await;

    let posted = client_for(&server, Some("t0k"))
        .post_comment("octo/hello", 7, "## Review")
        .await
        .unwrap();
    assert!(posted);
}
