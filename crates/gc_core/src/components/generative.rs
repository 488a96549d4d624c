//! Regrows a scalar attribute on a resource over time (spec.md §4.4).

use crate::ecs::{Component, System, World};

/// The attribute a `Generative` component drives. This engine's only
/// regrowable attribute is a harvestable resource's remaining yield, so the
/// attribute is named rather than reflected over by string (spec.md §9's
/// typed-capability re-architecture).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetAttr {
    HarvestableYield,
}

pub struct Generative {
    pub cycles: i64,
    /// Negative means unlimited.
    pub max_cycles: i64,
    pub ticks_per_cycle: u32,
    ticks: u32,
    pub increase_per_cycle: u32,
    pub max_value: u32,
    pub target_attr: TargetAttr,
}

impl Component for Generative {}

impl Generative {
    pub fn new(
        max_cycles: i64,
        ticks_per_cycle: u32,
        increase_per_cycle: u32,
        max_value: u32,
        target_attr: TargetAttr,
    ) -> Self {
        Generative {
            cycles: 0,
            max_cycles,
            ticks_per_cycle,
            ticks: 0,
            increase_per_cycle,
            max_value,
            target_attr,
        }
    }

    fn exhausted(&self) -> bool {
        self.max_cycles >= 0 && self.cycles >= self.max_cycles
    }
}

/// Advances every `Generative` component's owner attribute by one cycle's
/// worth of growth when its `ticks_per_cycle` elapses; removes bounded,
/// exhausted generators from their owner (spec.md §4.4).
pub struct GenerativeSystem;

impl System for GenerativeSystem {
    fn process(&mut self, _tick: i64, world: &mut World) {
        for entity in world.query1::<Generative>() {
            let (attr, max_value, exhausted) = {
                let gen = world.get::<Generative>(entity).unwrap();
                (gen.target_attr, gen.max_value, gen.exhausted())
            };

            if exhausted {
                let _ = world.detach::<Generative>(entity);
                continue;
            }

            let current = match attr {
                TargetAttr::HarvestableYield => world
                    .get::<crate::components::harvest::Harvestable>(entity)
                    .map(|h| h.current_yield()),
            };
            let Some(current) = current else { continue };
            if current >= max_value {
                continue;
            }

            let mut gen = world.get_mut::<Generative>(entity).unwrap();
            gen.ticks += 1;
            if gen.ticks < gen.ticks_per_cycle {
                continue;
            }
            gen.ticks = 0;
            gen.cycles += 1;
            let increase = gen.increase_per_cycle;
            drop(gen);

            match attr {
                TargetAttr::HarvestableYield => {
                    if let Some(mut h) = world.get_mut::<crate::components::harvest::Harvestable>(entity) {
                        h.regrow(increase, max_value);
                    }
                }
            }
        }
    }
}
