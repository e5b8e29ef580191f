use crate::entities::repository::{Language, Repository};
use crate::models::github_graphql::{LanguageNode, RepositoryNode};
use crate::models::user_repos::{LanguageSizes, TransformedRepository};

// The full name is built from the requested username, not the owner login.
// Repositories pulled in through collaborator or organization affiliations
// therefore carry the requesting user's name.
pub fn to_entity(username: &str, node: RepositoryNode) -> Repository {
    let languages = node
        .languages
        .map(|connection| connection.edges)
        .unwrap_or_default()
        .into_iter()
        .map(|edge| Language {
            name: edge.node.name,
            size: edge.size,
            color: non_empty(edge.node.color),
        })
        .collect();

    Repository {
        full_name: format!("{}/{}", username, node.name),
        id: node.id,
        name: node.name,
        url: node.url,
        primary_language: node.primary_language.map(to_language),
        languages,
    }
}

fn to_language(node: LanguageNode) -> Language {
    Language {
        name: node.name,
        size: None,
        color: non_empty(node.color),
    }
}

// GitHub reports some colors as an empty string; treat those as missing.
fn non_empty(color: Option<String>) -> Option<String> {
    color.filter(|c| !c.is_empty())
}

pub fn to_transformed(entity: &Repository) -> TransformedRepository {
    let mut languages = LanguageSizes::default();
    for language in &entity.languages {
        languages.insert(language.name.clone(), language.size.unwrap_or(0));
    }

    TransformedRepository {
        id: entity.id.clone(),
        name: entity.name.clone(),
        full_name: entity.full_name.clone(),
        language: entity.primary_language.as_ref().map(|l| l.name.clone()),
        languages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::github_graphql::{LanguageConnection, LanguageEdge};

    fn node(name: &str) -> RepositoryNode {
        RepositoryNode {
            id: format!("R_{}", name),
            name: name.into(),
            url: format!("https://github.com/some-org/{}", name),
            primary_language: Some(LanguageNode {
                name: "Rust".into(),
                color: Some("#dea584".into()),
            }),
            languages: Some(LanguageConnection {
                edges: vec![
                    LanguageEdge {
                        size: Some(1200),
                        node: LanguageNode { name: "Rust".into(), color: Some("#dea584".into()) },
                    },
                    LanguageEdge {
                        size: None,
                        node: LanguageNode { name: "Shell".into(), color: None },
                    },
                ],
            }),
        }
    }

    #[test]
    fn full_name_uses_requested_username() {
        let repo = to_entity("alice", node("repo1"));
        assert_eq!(repo.full_name, "alice/repo1");
        assert_eq!(repo.url, "https://github.com/some-org/repo1");
    }

    #[test]
    fn maps_languages_in_order() {
        let repo = to_entity("alice", node("repo1"));
        assert_eq!(repo.languages.len(), 2);
        assert_eq!(repo.languages[0].name, "Rust");
        assert_eq!(repo.languages[0].size, Some(1200));
        assert_eq!(repo.languages[1].color, None);
        assert_eq!(repo.primary_language.unwrap().name, "Rust");
    }

    #[test]
    fn missing_language_connection_is_empty() {
        let mut raw = node("bare");
        raw.languages = None;
        raw.primary_language = None;
        let repo = to_entity("alice", raw);
        assert!(repo.languages.is_empty());
        assert!(repo.primary_language.is_none());
    }

    #[test]
    fn empty_color_becomes_none() {
        let mut raw = node("repo1");
        raw.primary_language = Some(LanguageNode { name: "Rust".into(), color: Some(String::new()) });
        raw.languages = Some(LanguageConnection {
            edges: vec![LanguageEdge {
                size: Some(10),
                node: LanguageNode { name: "Rust".into(), color: Some(String::new()) },
            }],
        });
        let repo = to_entity("alice", raw);

        assert_eq!(repo.languages[0].color, None);
        assert_eq!(repo.primary_language.unwrap().color, None);
    }

    #[test]
    fn transformed_keeps_size_order_in_json() {
        let transformed = to_transformed(&to_entity("alice", node("repo1")));
        let json = serde_json::to_string(&transformed).unwrap();
        assert!(json.contains(r#""languages":{"Rust":1200,"Shell":0}"#));
    }

    #[test]
    fn transformed_collapses_languages_into_map() {
        let transformed = to_transformed(&to_entity("alice", node("repo1")));
        assert_eq!(transformed.full_name, "alice/repo1");
        assert_eq!(transformed.language.as_deref(), Some("Rust"));
        assert_eq!(transformed.languages.get("Rust"), Some(&1200));
        assert_eq!(transformed.languages.get("Shell"), Some(&0));
    }
}
