//! Deterministic construction of the tweet lookup query.
//!
//! The GraphQL endpoint identifies the operation by a fixed query ID and
//! expects two URL-encoded JSON query parameters: `variables` (the post ID
//! plus three toggles, all off) and `features` (a fixed flag object the
//! endpoint refuses to work without).

use serde::Serialize;
use serde_json::json;

/// Persisted-query identifier for `TweetResultByRestId`.
pub const TWEET_QUERY_ID: &str = "2ICDjqPd81tulZcYrtpTuQ";

/// GraphQL operation name.
pub const TWEET_QUERY_OPERATION: &str = "TweetResultByRestId";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TweetQueryVariables<'a> {
    tweet_id: &'a str,
    with_community: bool,
    include_promoted_content: bool,
    with_voice: bool,
}

fn feature_flags() -> serde_json::Value {
    json!({
        "creator_subscriptions_tweet_preview_api_enabled": true,
        "tweetypie_unmention_optimization_enabled": true,
        "responsive_web_edit_tweet_api_enabled": true,
        "graphql_is_translatable_rweb_tweet_is_translatable_enabled": true,
        "view_counts_everywhere_api_enabled": true,
        "longform_notetweets_consumption_enabled": true,
        "responsive_web_twitter_article_tweet_consumption_enabled": false,
        "tweet_awards_web_tipping_enabled": false,
        "freedom_of_speech_not_reach_fetch_enabled": true,
        "standardized_nudges_misinfo": true,
        "tweet_with_visibility_results_prefer_gql_limited_actions_policy_enabled": true,
        "longform_notetweets_rich_text_read_enabled": true,
        "longform_notetweets_inline_media_enabled": true,
        "responsive_web_graphql_exclude_directive_enabled": true,
        "verified_phone_label_enabled": false,
        "responsive_web_media_download_video_enabled": false,
        "responsive_web_graphql_skip_user_profile_image_extensions_enabled": false,
        "responsive_web_graphql_timeline_navigation_enabled": true,
        "responsive_web_enhance_cards_enabled": false,
    })
}

/// Build the lookup URL for a post ID.
///
/// Pure and deterministic: the same `tweet_id` always yields the same URL,
/// and the encoded `"tweetId":"<id>"` assignment is always present.
pub fn build_tweet_query_url(base_url: &str, tweet_id: &str) -> String {
    let variables = serde_json::to_string(&TweetQueryVariables {
        tweet_id,
        with_community: false,
        include_promoted_content: false,
        with_voice: false,
    })
    .expect("query variables serialize");
    let features = feature_flags().to_string();

    format!(
        "{}/graphql/{}/{}?variables={}&features={}",
        base_url.trim_end_matches('/'),
        TWEET_QUERY_ID,
        TWEET_QUERY_OPERATION,
        percent_encode(&variables),
        percent_encode(&features),
    )
}

const UPPERHEX: [u8; 16] = *b"0123456789ABCDEF";

/// RFC 3986 percent-encoding for query parameter values. Everything outside
/// the unreserved set is escaped, matching what `encodeURIComponent` emits
/// for JSON payloads.
fn percent_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len() * 3);
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char);
            }
            _ => {
                out.push('%');
                out.push(char::from(UPPERHEX[(b >> 4) as usize]));
                out.push(char::from(UPPERHEX[(b & 0x0f) as usize]));
            }
        }
    }
    out
}
