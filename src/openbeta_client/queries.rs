//! GraphQL documents sent to the OpenBeta API.

/// Areas fetched per page. 500 is the maximum the API allows.
pub const AREAS_PAGE_SIZE: i64 = 500;

/// All countries with their UUIDs.
pub const COUNTRIES_QUERY: &str = "
query GetCountries {
  countries {
    areaName
    uuid
  }
}
";

/// Child area names of an area identified by UUID.
pub const CHILDREN_BY_UUID_QUERY: &str = "
query GetChildren($uuid: ID!) {
  area(uuid: $uuid) {
    children {
      areaName
    }
  }
}
";

/// Child area names of a non-leaf area identified by its token path.
pub const CHILDREN_BY_PATH_QUERY: &str = "
query GetAreaByPath($tokens: [String!]!) {
  areas(filter: {path_tokens: {tokens: $tokens, exactMatch: true}, leaf_status: {isLeaf: false}}) {
    uuid
    children {
      areaName
    }
  }
}
";

/// Leaf areas under a token path, with their climbs. Paginated because the
/// API defaults to 50 results.
pub const AREAS_QUERY: &str = "
query GetAreas($tokens: [String!]!, $limit: Int!, $offset: Int!) {
  areas(filter: {leaf_status: {isLeaf: true}, path_tokens: {tokens: $tokens}}, limit: $limit, offset: $offset) {
    uuid
    area_name
    pathTokens
    metadata {
      lat
      lng
    }
    climbs {
      uuid
      name
      fa
      length
      boltsCount
      grades {
        yds
        vscale
        french
      }
      type {
        sport
        trad
        bouldering
        alpine
        tr
      }
      safety
      metadata {
        lat
        lng
      }
      content {
        description
      }
      pathTokens
    }
  }
}
";
