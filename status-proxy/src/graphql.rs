//! Wire format of the upstream GraphQL API.
//!
//! Every nested field is optional on the wire. Missing connections decode to
//! no edges and missing page info means there are no further pages.

use crate::types::{Page, ServiceStatusRecord};
use serde::{Deserialize, Serialize};

pub const PROJECTS_QUERY: &str = r#"
query Projects($after: String) {
  projects(first: 50, after: $after) {
    pageInfo {
      hasNextPage
      endCursor
    }
    edges {
      node {
        id
        name
        services {
          edges {
            node {
              id
              name
              serviceInstances {
                edges {
                  node {
                    latestDeployment {
                      id
                      status
                      staticUrl
                      deploymentStopped
                    }
                  }
                }
              }
            }
          }
        }
      }
    }
  }
}
"#;

#[derive(Serialize, Debug)]
pub struct GraphQlRequest<'a> {
    pub query: &'a str,
    pub variables: Variables<'a>,
}

#[derive(Serialize, Debug)]
pub struct Variables<'a> {
    // Serialized as null on the first page.
    pub after: Option<&'a str>,
}

impl<'a> GraphQlRequest<'a> {
    pub fn projects(after: Option<&'a str>) -> Self {
        GraphQlRequest {
            query: PROJECTS_QUERY,
            variables: Variables { after },
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct GraphQlResponse {
    #[serde(default)]
    pub data: Option<ProjectsData>,
    #[serde(default)]
    pub errors: Option<Vec<serde_json::Value>>,
}

impl GraphQlResponse {
    /// Returns the error payload if the upstream reported any errors.
    pub fn take_errors(&mut self) -> Option<serde_json::Value> {
        self.errors
            .take()
            .filter(|errors| !errors.is_empty())
            .map(serde_json::Value::Array)
    }

    pub fn into_page(self) -> Page {
        self.data
            .and_then(|data| data.projects)
            .map(Connection::into_page)
            .unwrap_or_else(|| Page {
                project_count: 0,
                records: Vec::new(),
                has_next_page: false,
                end_cursor: None,
            })
    }
}

#[derive(Deserialize, Debug)]
pub struct ProjectsData {
    #[serde(default)]
    pub projects: Option<Connection<Project>>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    #[serde(default = "Option::default")]
    pub edges: Option<Vec<Edge<T>>>,
    #[serde(default)]
    pub page_info: Option<PageInfo>,
}

impl<T> Connection<T> {
    fn nodes(self) -> impl Iterator<Item = T> {
        self.edges.into_iter().flatten().filter_map(|edge| edge.node)
    }

    fn first_node(self) -> Option<T> {
        self.nodes().next()
    }
}

#[derive(Deserialize, Debug)]
pub struct Edge<T> {
    #[serde(default = "Option::default")]
    pub node: Option<T>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub has_next_page: Option<bool>,
    #[serde(default)]
    pub end_cursor: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub services: Option<Connection<Service>>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub service_instances: Option<Connection<ServiceInstance>>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInstance {
    #[serde(default)]
    pub latest_deployment: Option<Deployment>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub static_url: Option<String>,
    #[serde(default)]
    pub deployment_stopped: Option<bool>,
}

impl Connection<Project> {
    /// Flattens one page of projects into service status records.
    /// Only the first instance of each service is considered, and services
    /// whose first instance has no latest deployment are skipped.
    pub fn into_page(self) -> Page {
        let page_info = self.page_info.as_ref();
        let has_next_page = page_info.and_then(|info| info.has_next_page).unwrap_or(false);
        let end_cursor = page_info.and_then(|info| info.end_cursor.clone());

        let projects: Vec<Project> = self.nodes().collect();
        let project_count = projects.len();

        let mut records = Vec::new();
        for project in projects {
            let Some(services) = project.services else {
                continue;
            };

            for service in services.nodes() {
                let deployment = service
                    .service_instances
                    .and_then(Connection::first_node)
                    .and_then(|instance| instance.latest_deployment);

                if let Some(deployment) = deployment {
                    records.push(ServiceStatusRecord {
                        project_id: project.id.clone(),
                        project_name: project.name.clone(),
                        service_id: service.id,
                        service_name: service.name,
                        deployment_id: deployment.id,
                        status: deployment.status,
                        static_url: deployment.static_url,
                        deployment_stopped: deployment.deployment_stopped.unwrap_or(false),
                    });
                }
            }
        }

        Page {
            project_count,
            records,
            has_next_page,
            end_cursor,
        }
    }
}
