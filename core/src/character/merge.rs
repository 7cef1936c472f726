//! Priority-ordered merge of active movement contributions.
//!
//! The merge is a single pass over humanoid data records in effect
//! insertion order. Increments accumulate until the first `Set` applies;
//! once one has, every later increment in the pass is skipped. A `Set`
//! only applies while its priority strictly exceeds the highest `Set`
//! priority applied so far, so higher-priority sets win regardless of
//! arrival order.

use aegis_types::{HumanoidData, MergeMode, MovementProps, Prop, PropValue};
use hashbrown::HashMap;

/// Merge `datas` (in iteration order) over a copy of `defaults`.
pub(crate) fn merge_props(defaults: &MovementProps, datas: &[HumanoidData]) -> MovementProps {
    let mut merged = *defaults;
    // Per-property highest Increment priority applied so far (flags only).
    let mut incr_priority: HashMap<Prop, i32> = HashMap::new();
    // Highest Set priority applied so far; unset until the first Set lands.
    let mut set_priority: Option<i32> = None;

    for data in datas {
        match data.mode {
            MergeMode::Increment => {
                // Increments only count before the first applied Set.
                if set_priority.is_some() {
                    continue;
                }
                for (&prop, &value) in &data.props {
                    match value {
                        PropValue::Num(n) => {
                            if let PropValue::Num(current) = merged.get(prop) {
                                merged.set(prop, PropValue::Num(current + n));
                            }
                        }
                        PropValue::Flag(_) => {
                            let recorded = incr_priority.get(&prop).copied().unwrap_or(0);
                            if data.priority > recorded {
                                merged.set(prop, value);
                                incr_priority.insert(prop, data.priority);
                            }
                        }
                    }
                }
            }
            MergeMode::Set => {
                if set_priority.is_none_or(|p| data.priority > p) {
                    for (&prop, &value) in &data.props {
                        merged.set(prop, value);
                    }
                    set_priority = Some(data.priority);
                }
            }
        }
    }

    merged
}
