//! Listing query for `GET /api/articles`.
//!
//! Diesel can bind values but not identifiers, so the sort column and
//! direction are spliced into the SQL text. They only ever come from the
//! closed `SortBy` and `Order` enums below; the topic filter is always a
//! bound parameter.

use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::Text;

use super::{Article, ARTICLE_COLUMNS};
use crate::topic::Topic;
use crate::types::{ApiError, ErrorKind, Validate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    ArticleId,
    Author,
    Votes,
    #[default]
    CreatedAt,
    CommentCount,
    Title,
    Topic,
}

impl SortBy {
    pub fn parse(value: &str) -> Option<SortBy> {
        match value {
            "article_id" => Some(SortBy::ArticleId),
            "author" => Some(SortBy::Author),
            "votes" => Some(SortBy::Votes),
            "created_at" => Some(SortBy::CreatedAt),
            "comment_count" => Some(SortBy::CommentCount),
            "title" => Some(SortBy::Title),
            "topic" => Some(SortBy::Topic),
            _ => None,
        }
    }

    /// `comment_count` is the aggregate's alias; everything else is qualified
    /// because `comments` shares several column names with `articles`.
    pub fn column(self) -> &'static str {
        match self {
            SortBy::ArticleId => "articles.article_id",
            SortBy::Author => "articles.author",
            SortBy::Votes => "articles.votes",
            SortBy::CreatedAt => "articles.created_at",
            SortBy::CommentCount => "comment_count",
            SortBy::Title => "articles.title",
            SortBy::Topic => "articles.topic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    Asc,
    #[default]
    Desc,
}

impl Order {
    pub fn parse(value: &str) -> Option<Order> {
        match value {
            "asc" => Some(Order::Asc),
            "desc" => Some(Order::Desc),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

/// Raw query string of the listing endpoint.
#[derive(Debug, Default, FromForm)]
pub struct ListingParams {
    pub topic: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArticleQuery {
    pub topic: Option<String>,
    pub sort_by: SortBy,
    pub order: Order,
}

impl Validate for ListingParams {
    type Valid = ArticleQuery;

    fn validate(self) -> Result<ArticleQuery, ApiError> {
        let order = match self.order {
            Some(order) => Order::parse(&order).ok_or_else(ApiError::malformed)?,
            None => Order::default(),
        };
        let sort_by = match self.sort_by {
            Some(sort_by) => SortBy::parse(&sort_by).ok_or_else(ApiError::malformed)?,
            None => SortBy::default(),
        };
        Ok(ArticleQuery {
            topic: self.topic,
            sort_by,
            order,
        })
    }
}

impl ArticleQuery {
    pub fn to_sql(&self) -> String {
        let filter = match self.topic {
            Some(_) => " WHERE articles.topic = $1",
            None => "",
        };
        let tie_break = match self.sort_by {
            SortBy::ArticleId => "",
            _ => ", articles.article_id ASC",
        };
        format!(
            "SELECT {}, COUNT(comments.comment_id)::int AS comment_count \
             FROM articles LEFT JOIN comments ON comments.article_id = articles.article_id\
             {} GROUP BY articles.article_id ORDER BY {} {}{}",
            ARTICLE_COLUMNS,
            filter,
            self.sort_by.column(),
            self.order.keyword(),
            tie_break
        )
    }

    /// Runs the listing. A topic filter is checked against `topics` first so
    /// an unknown topic is an error while a known but empty one is `[]`.
    pub fn load(&self, connection: &mut PgConnection) -> Result<Vec<Article>, ApiError> {
        let sql = self.to_sql();
        match self.topic {
            Some(ref topic) => {
                if !Topic::exists(topic, connection)? {
                    return Err(ErrorKind::TopicNotFound.into());
                }
                sql_query(sql)
                    .bind::<Text, _>(topic)
                    .load::<Article>(connection)
                    .map_err(|e| e.into())
            }
            None => sql_query(sql)
                .load::<Article>(connection)
                .map_err(|e| e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn params(topic: Option<&str>, sort_by: Option<&str>, order: Option<&str>) -> ListingParams {
        ListingParams {
            topic: topic.map(String::from),
            sort_by: sort_by.map(String::from),
            order: order.map(String::from),
        }
    }

    #[test]
    fn defaults_to_newest_first() {
        let query = ListingParams::default().validate().unwrap();
        assert_eq!(query.sort_by, SortBy::CreatedAt);
        assert_eq!(query.order, Order::Desc);
        assert_eq!(query.topic, None);
    }

    #[rstest]
    #[case("article_id", SortBy::ArticleId)]
    #[case("author", SortBy::Author)]
    #[case("votes", SortBy::Votes)]
    #[case("created_at", SortBy::CreatedAt)]
    #[case("comment_count", SortBy::CommentCount)]
    #[case("title", SortBy::Title)]
    #[case("topic", SortBy::Topic)]
    fn accepts_sortable_columns(#[case] raw: &str, #[case] expected: SortBy) {
        let query = params(None, Some(raw), Some("asc")).validate().unwrap();
        assert_eq!(query.sort_by, expected);
        assert_eq!(query.order, Order::Asc);
    }

    #[rstest]
    #[case(Some("body"), None)]
    #[case(Some("votes; DROP TABLE articles"), None)]
    #[case(Some("VOTES"), None)]
    #[case(None, Some("sideways"))]
    #[case(None, Some("ASC"))]
    #[case(None, Some(""))]
    fn rejects_anything_else(#[case] sort_by: Option<&str>, #[case] order: Option<&str>) {
        let err = params(None, sort_by, order).validate().unwrap_err();
        assert!(matches!(err, ApiError::Rejected(ErrorKind::Malformed)));
    }

    #[rstest]
    #[case(SortBy::ArticleId, Order::Asc, "ORDER BY articles.article_id ASC")]
    #[case(SortBy::Author, Order::Desc, "ORDER BY articles.author DESC, articles.article_id ASC")]
    #[case(SortBy::Votes, Order::Asc, "ORDER BY articles.votes ASC, articles.article_id ASC")]
    #[case(SortBy::CreatedAt, Order::Desc, "ORDER BY articles.created_at DESC, articles.article_id ASC")]
    #[case(SortBy::CommentCount, Order::Desc, "ORDER BY comment_count DESC, articles.article_id ASC")]
    #[case(SortBy::Title, Order::Asc, "ORDER BY articles.title ASC, articles.article_id ASC")]
    #[case(SortBy::Topic, Order::Desc, "ORDER BY articles.topic DESC, articles.article_id ASC")]
    fn orders_by_validated_column(#[case] sort_by: SortBy, #[case] order: Order, #[case] expected: &str) {
        let sql = ArticleQuery { topic: None, sort_by, order }.to_sql();
        assert!(sql.ends_with(expected), "{}", sql);
    }

    #[test]
    fn topic_is_bound_not_interpolated() {
        let query = params(Some("cats' OR '1'='1"), None, None).validate().unwrap();
        let sql = query.to_sql();
        assert!(sql.contains("WHERE articles.topic = $1 GROUP BY"), "{}", sql);
        assert!(!sql.contains("cats"));
    }

    #[test]
    fn keeps_articles_without_comments() {
        let sql = ArticleQuery::default().to_sql();
        assert!(sql.contains("FROM articles LEFT JOIN comments"), "{}", sql);
        assert!(sql.contains("COUNT(comments.comment_id)::int AS comment_count"));
        assert!(!sql.contains("WHERE"));
    }
}
