use crate::error::AppError;
use crate::models::{ContributionCalendar, Repository};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

// --- GraphQL Documents ---

const CONTRIBUTION_QUERY_NAME: &str = "contributionCalendar";
const CONTRIBUTION_QUERY: &str = r#"
query($userName: String!) {
  user(login: $userName) {
    contributionsCollection {
      contributionCalendar {
        totalContributions
        weeks {
          contributionDays {
            contributionCount
            date
          }
        }
      }
    }
  }
}
"#;

const LANGUAGES_QUERY_NAME: &str = "repositoryLanguages";
const LANGUAGES_QUERY: &str = r#"
query($userName: String!) {
  user(login: $userName) {
    repositories(ownerAffiliations: OWNER, isFork: false, first: 100, orderBy: {field: PUSHED_AT, direction: DESC}) {
      nodes {
        name
        languages(first: 10, orderBy: {field: SIZE, direction: DESC}) {
          edges {
            size
            node {
              name
              color
            }
          }
        }
      }
    }
  }
}
"#;

// --- Data Structures for API Communication ---

#[derive(Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: UserVariables<'a>,
}

#[derive(Serialize)]
struct UserVariables<'a> {
    #[serde(rename = "userName")]
    user_name: &'a str,
}

#[derive(Deserialize, Debug)]
struct GraphQlResponse<T> {
    data: Option<UserData<T>>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize, Debug)]
struct GraphQlError {
    message: String,
}

// NOTE: `user` is null when the login does not exist.
#[derive(Deserialize, Debug)]
struct UserData<T> {
    user: Option<T>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ContributionsUser {
    contributions_collection: ContributionsCollection,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ContributionsCollection {
    contribution_calendar: ContributionCalendar,
}

#[derive(Deserialize, Debug)]
struct RepositoriesUser {
    repositories: RepositoryConnection,
}

#[derive(Deserialize, Debug)]
struct RepositoryConnection {
    #[serde(default)]
    nodes: Vec<Option<Repository>>,
}

// --- Source Abstraction ---

/// Where contribution and language data comes from
pub trait StatsSource {
    async fn fetch_contribution_calendar(&self, user: &str)
    -> Result<ContributionCalendar, AppError>;

    async fn fetch_repository_languages(&self, user: &str) -> Result<Vec<Repository>, AppError>;
}

// --- API Client ---

const API_URL: &str = "https://api.github.com/graphql";
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub struct GithubClient {
    client: reqwest::Client,
    token: String,
}

impl GithubClient {
    pub fn new(token: String) -> Result<Self, AppError> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client, token })
    }

    async fn run_query<T: DeserializeOwned>(
        &self,
        name: &'static str,
        query: &str,
        user: &str,
    ) -> Result<T, AppError> {
        let request_body = GraphQlRequest {
            query,
            variables: UserVariables { user_name: user },
        };

        debug!(query = name, user, "sending GraphQL query");
        let response = self
            .client
            .post(API_URL)
            .bearer_auth(&self.token)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Api {
                status,
                query: name,
            });
        }

        let body = response.text().await?;
        debug!(query = name, bytes = body.len(), "received GraphQL response");
        parse_response(name, &body)
    }
}

impl StatsSource for GithubClient {
    async fn fetch_contribution_calendar(
        &self,
        user: &str,
    ) -> Result<ContributionCalendar, AppError> {
        let data: ContributionsUser = self
            .run_query(CONTRIBUTION_QUERY_NAME, CONTRIBUTION_QUERY, user)
            .await?;
        Ok(data.contributions_collection.contribution_calendar)
    }

    async fn fetch_repository_languages(&self, user: &str) -> Result<Vec<Repository>, AppError> {
        let data: RepositoriesUser = self
            .run_query(LANGUAGES_QUERY_NAME, LANGUAGES_QUERY, user)
            .await?;
        Ok(data.repositories.nodes.into_iter().flatten().collect())
    }
}

/// Decode a GraphQL response body, surfacing `errors` and missing `data` as failures
fn parse_response<T: DeserializeOwned>(name: &'static str, body: &str) -> Result<T, AppError> {
    let response: GraphQlResponse<T> =
        serde_json::from_str(body).map_err(|e| AppError::MalformedResponse {
            query: name,
            detail: e.to_string(),
        })?;

    if let Some(errors) = response.errors
        && !errors.is_empty()
    {
        return Err(AppError::GraphQl {
            query: name,
            messages: errors.into_iter().map(|e| e.message).collect(),
        });
    }

    response
        .data
        .and_then(|data| data.user)
        .ok_or(AppError::MalformedResponse {
            query: name,
            detail: "response has no user data".to_string(),
        })
}
