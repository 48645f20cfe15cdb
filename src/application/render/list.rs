//! Grouping of contiguous list-family siblings.

use crate::domain::block::Block;

/// List item types and the container each run of them renders through.
pub const LIST_FAMILY: [(&str, &str); 3] = [
    ("bulleted_list_item", "bulleted_list"),
    ("numbered_list_item", "numbered_list"),
    ("to_do", "to_do_list"),
];

/// Container name for a list item type, `None` for everything else.
pub fn container_for(item_type: &str) -> Option<&'static str> {
    LIST_FAMILY
        .iter()
        .find(|(item, _)| *item == item_type)
        .map(|(_, container)| *container)
}

/// One output element of a sibling sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderUnit<'a> {
    Single(&'a Block),
    /// Maximal run of adjacent blocks sharing one list item type.
    Run {
        item_type: &'a str,
        container: &'static str,
        items: &'a [Block],
    },
}

/// Split siblings into render units with a single forward pass. A run only
/// continues while the next block has exactly the same type, so alternating
/// list kinds produce separate single-item runs.
pub fn group_units(blocks: &[Block]) -> Vec<RenderUnit<'_>> {
    let mut units = Vec::new();
    let mut index = 0;

    while index < blocks.len() {
        let block = &blocks[index];
        let Some(container) = container_for(&block.block_type) else {
            units.push(RenderUnit::Single(block));
            index += 1;
            continue;
        };

        let end = blocks[index..]
            .iter()
            .position(|next| next.block_type != block.block_type)
            .map_or(blocks.len(), |offset| index + offset);
        units.push(RenderUnit::Run {
            item_type: block.block_type.as_str(),
            container,
            items: &blocks[index..end],
        });
        index = end;
    }

    units
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::block::BlockPayload;

    fn block(id: &str, block_type: &str) -> Block {
        Block::new(id, block_type, BlockPayload::Divider)
    }

    fn shape(units: &[RenderUnit<'_>]) -> Vec<(String, usize)> {
        units
            .iter()
            .map(|unit| match unit {
                RenderUnit::Single(block) => (block.block_type.clone(), 1),
                RenderUnit::Run {
                    container, items, ..
                } => (container.to_string(), items.len()),
            })
            .collect()
    }

    #[test]
    fn contiguous_items_form_one_run() {
        let blocks = vec![
            block("1", "bulleted_list_item"),
            block("2", "bulleted_list_item"),
            block("3", "bulleted_list_item"),
            block("4", "paragraph"),
        ];
        assert_eq!(
            shape(&group_units(&blocks)),
            [("bulleted_list".to_string(), 3), ("paragraph".to_string(), 1)]
        );
    }

    #[test]
    fn alternating_list_kinds_do_not_merge() {
        let blocks = vec![
            block("1", "bulleted_list_item"),
            block("2", "numbered_list_item"),
            block("3", "bulleted_list_item"),
        ];
        assert_eq!(
            shape(&group_units(&blocks)),
            [
                ("bulleted_list".to_string(), 1),
                ("numbered_list".to_string(), 1),
                ("bulleted_list".to_string(), 1),
            ]
        );
    }

    #[test]
    fn run_at_end_of_siblings_is_closed() {
        let blocks = vec![block("1", "heading_1"), block("2", "to_do"), block("3", "to_do")];
        let units = group_units(&blocks);
        assert_eq!(units.len(), 2);
        match units[1] {
            RenderUnit::Run {
                item_type, items, ..
            } => {
                assert_eq!(item_type, "to_do");
                assert_eq!(items[0].id, "2");
                assert_eq!(items[1].id, "3");
            }
            other => panic!("expected a run, got {other:?}"),
        }
    }

    #[test]
    fn non_list_types_have_no_container() {
        assert_eq!(container_for("paragraph"), None);
        assert_eq!(container_for("to_do"), Some("to_do_list"));
        assert!(group_units(&[]).is_empty());
    }
}
