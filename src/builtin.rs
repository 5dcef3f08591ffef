// ABOUTME: Static built-in coach catalog used by the anonymous run path
// ABOUTME: Five fixed templates with two context slots and one value lever each
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Flow Catalyst

//! Built-in coach catalog
//!
//! The client ships these templates and can run them without an account. The
//! first three form the free tier; all five are available to pro users.
//! Nothing here is persisted; the catalog is compiled into the binary.

use serde::Serialize;

use crate::models::Plan;

/// Number of coaches available on the free tier
pub const FREE_TIER_COUNT: usize = 3;

/// A fixed, non-persisted catalyst-like template
#[derive(Debug, Clone, Serialize)]
pub struct BuiltInCoach {
    /// Stable identifier referenced by the client
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Prompt template with placeholder slots
    pub prompt_template: &'static str,
    /// The two named context slots the client fills in
    pub context_slots: [&'static str; 2],
    /// The single adjustable "value lever" input
    pub value_lever: &'static str,
    /// Minimum plan required to use this coach
    pub tier: Plan,
}

/// The full catalog, free-tier coaches first
pub const CATALOG: [BuiltInCoach; 5] = [
    BuiltInCoach {
        id: "hook",
        name: "Opening Hook",
        prompt_template: "Write an attention-grabbing opening for {topic} aimed at {audience}. \
Lean the framing toward {angle}.",
        context_slots: ["topic", "audience"],
        value_lever: "angle",
        tier: Plan::Free,
    },
    BuiltInCoach {
        id: "clarity",
        name: "Clarity Pass",
        prompt_template: "Rewrite the following message about {topic} for {reader} so the main \
point lands in the first sentence. Optimize for {priority}.",
        context_slots: ["topic", "reader"],
        value_lever: "priority",
        tier: Plan::Free,
    },
    BuiltInCoach {
        id: "momentum",
        name: "Momentum Kickstart",
        prompt_template: "I am stuck on {task} in the context of {project}. Give me three \
concrete next actions, ordered by {criterion}.",
        context_slots: ["task", "project"],
        value_lever: "criterion",
        tier: Plan::Free,
    },
    BuiltInCoach {
        id: "deep-work",
        name: "Deep Work Planner",
        prompt_template: "Plan a deep-work block for {goal} given my schedule constraints: \
{constraints}. Bias the plan toward {tradeoff}.",
        context_slots: ["goal", "constraints"],
        value_lever: "tradeoff",
        tier: Plan::Pro,
    },
    BuiltInCoach {
        id: "negotiation",
        name: "Negotiation Prep",
        prompt_template: "Prepare me for a negotiation about {subject} with {counterpart}. \
Emphasize {leverage} in the talking points.",
        context_slots: ["subject", "counterpart"],
        value_lever: "leverage",
        tier: Plan::Pro,
    },
];

/// Look up a coach by id
#[must_use]
pub fn find(id: &str) -> Option<&'static BuiltInCoach> {
    CATALOG.iter().find(|c| c.id == id)
}

/// Coaches visible to the given plan
#[must_use]
pub fn for_plan(plan: Plan) -> Vec<&'static BuiltInCoach> {
    CATALOG
        .iter()
        .filter(|c| plan.is_pro() || !c.tier.is_pro())
        .collect()
}
