//! Group section.
//!
//! The decoded content is a list of numbered blocks, each with up to three
//! bucket tags holding whitespace-separated question IDs:
//!
//! ```text
//! <0>
//! <tv_i>1 2 3</tv_i>
//! <tv_p>4</tv_p>
//! <tv_d></tv_d>
//! </0>
//! ```

use crate::model::{Group, GroupBuckets};
use crate::tags::{extract_tag, NumberedBlocks};

/// ID given to a group section that has bucket tags but no numbered blocks.
const IMPLICIT_GROUP_ID: &str = "0";

/// Parses the group section. `buckets` names the three bucket tags in order.
pub fn parse_groups(text: &str, buckets: &[String; 3]) -> Vec<Group> {
    let mut groups: Vec<Group> = NumberedBlocks::new(text)
        .map(|block| Group {
            id: block.id.to_string(),
            question_ids: parse_buckets(block.content, buckets),
        })
        .collect();

    if groups.is_empty() {
        let question_ids = parse_buckets(text, buckets);
        if !question_ids.is_empty() {
            groups.push(Group {
                id: IMPLICIT_GROUP_ID.to_string(),
                question_ids,
            });
        }
    }

    groups
}

fn parse_buckets(content: &str, names: &[String; 3]) -> GroupBuckets {
    let ids = |name: &str| -> Vec<String> {
        extract_tag(content, name)
            .map(|list| list.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    };

    GroupBuckets {
        tv_i: ids(&names[0]),
        tv_p: ids(&names[1]),
        tv_d: ids(&names[2]),
    }
}
