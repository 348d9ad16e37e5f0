//! Canned response sets for the scripted driver, plus the lightweight
//! conversation memory that resolves short follow-up queries.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseStep {
    pub tool: &'static str,
    pub result: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSet {
    pub steps: Vec<ResponseStep>,
    pub final_answer: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    House,
    Office,
}

/// Explicit conversation memory. Passed into and returned from [`advance`]
/// so independent driver instances never share topic state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationContext {
    pub topic: Option<Topic>,
}

/// Selects the response set for `query`. Precedence: a trigger phrase in the
/// lowered query sets a fresh topic; otherwise an active topic may resolve a
/// follow-up; otherwise the default set is used and the topic is kept as-is.
pub fn advance(query: &str, context: &ConversationContext) -> (ResponseSet, ConversationContext) {
    let lowered = query.to_lowercase();

    if lowered.contains("house") {
        return (house_set(), ConversationContext { topic: Some(Topic::House) });
    }
    if lowered.contains("office") {
        return (office_set(), ConversationContext { topic: Some(Topic::Office) });
    }

    if lowered.contains("cost") {
        match context.topic {
            Some(Topic::House) => return (house_cost_set(), context.clone()),
            Some(Topic::Office) => return (office_cost_set(), context.clone()),
            None => {}
        }
    }

    (default_set(), context.clone())
}

fn step(tool: &'static str, result: &'static str) -> ResponseStep {
    ResponseStep { tool, result }
}

fn default_set() -> ResponseSet {
    ResponseSet {
        steps: vec![
            step(
                "search_documents",
                "Found 3 relevant documents:\n- Document 1: Project specifications\n- Document 2: Building codes\n- Document 3: Material specifications",
            ),
            step(
                "analyze_requirements",
                "Requirements analysis complete:\n- Minimum floor area: 2000 sq ft\n- Maximum height: 30 ft\n- Energy efficiency rating: A",
            ),
            step(
                "generate_options",
                "Generated 4 design options with different layouts and specifications.",
            ),
        ],
        final_answer: "Based on the requirements analysis and available documents, I've generated 4 design options that meet all specifications. Each option varies in layout, material usage, and energy efficiency approaches. Option 3 provides the best balance of space utilization and energy efficiency.",
    }
}

fn house_set() -> ResponseSet {
    ResponseSet {
        steps: vec![
            step(
                "search_building_types",
                "Found residential building types:\n- Single family home\n- Duplex\n- Townhouse\n- Apartment building",
            ),
            step(
                "analyze_residential_requirements",
                "Standard residential requirements:\n- Minimum bedroom size: 70 sq ft\n- Minimum ceiling height: 7 ft\n- Egress requirements for bedrooms\n- Kitchen and bathroom ventilation",
            ),
            step(
                "generate_house_design",
                "Generated basic house design with:\n- 3 bedrooms\n- 2 bathrooms\n- Open concept kitchen/living area\n- 2-car garage\n- Total area: 1,800 sq ft",
            ),
            step(
                "calculate_energy_efficiency",
                "Energy efficiency calculation:\n- Insulation R-value: 19 (walls), 38 (roof)\n- Window efficiency: U-factor 0.30\n- HVAC efficiency: 16 SEER\n- Estimated energy consumption: 45 kWh/m\u{b2}/year",
            ),
        ],
        final_answer: "I've designed a 1,800 sq ft single-family home with 3 bedrooms and 2 bathrooms. The design features an open concept living area, energy-efficient appliances, and meets all standard residential building codes. The estimated energy consumption is 45 kWh/m\u{b2}/year, which qualifies for an A energy rating.",
    }
}

fn office_set() -> ResponseSet {
    ResponseSet {
        steps: vec![
            step(
                "search_commercial_requirements",
                "Commercial building requirements:\n- Accessibility standards (ADA compliance)\n- Fire safety regulations\n- Minimum parking requirements\n- Ventilation standards for commercial spaces",
            ),
            step(
                "analyze_office_space_needs",
                "Office space analysis:\n- Typical workspace: 75-150 sq ft per employee\n- Conference rooms: 25-30 sq ft per person\n- Circulation space: 25-30% of total area\n- Support spaces (kitchen, restrooms): 15-20% of total area",
            ),
            step(
                "generate_office_layout",
                "Generated office building layout:\n- 5 floors, 10,000 sq ft per floor\n- Open office areas with flexible workstations\n- 8 conference rooms of varying sizes\n- Central core with elevators, stairs, and restrooms\n- Ground floor reception and caf\u{e9} area",
            ),
            step(
                "calculate_construction_costs",
                "Construction cost estimate:\n- Structure: $8.5M\n- MEP systems: $3.2M\n- Interior finishes: $2.8M\n- Site work: $1.5M\n- Total estimated cost: $16M ($320 per sq ft)",
            ),
        ],
        final_answer: "I've designed a 50,000 sq ft office building with 5 floors. The design features flexible open office areas, 8 conference rooms, and support spaces including a ground floor caf\u{e9}. The building meets all commercial building codes including ADA requirements and fire safety regulations. The estimated construction cost is $16 million ($320 per square foot).",
    }
}

fn house_cost_set() -> ResponseSet {
    ResponseSet {
        steps: vec![
            step(
                "calculate_cost",
                "Construction cost estimate for the 1,800 sq ft house:\n- Foundation and structure: $126,000\n- Exterior finishes and roofing: $58,000\n- Interior finishes: $72,000\n- MEP systems: $49,000\n- Site work and garage: $20,000\n- Total estimated cost: $325,000 ($180 per sq ft)",
            ),
        ],
        final_answer: "The estimated construction cost for the 1,800 sq ft single-family home is $325,000, or about $180 per square foot. The largest share is foundation and structure at $126,000, followed by interior finishes at $72,000. Energy-efficient upgrades account for roughly 4% of the total and pay back within 8 years through reduced consumption.",
    }
}

fn office_cost_set() -> ResponseSet {
    ResponseSet {
        steps: vec![
            step(
                "calculate_cost",
                "Cost breakdown for the 50,000 sq ft office building:\n- Structure: $8.5M\n- MEP systems: $3.2M\n- Interior finishes: $2.8M\n- Site work: $1.5M\n- Total estimated cost: $16M ($320 per sq ft)",
            ),
        ],
        final_answer: "The office building's total estimated construction cost is $16 million, or $320 per square foot. Structure dominates at $8.5M, with MEP systems at $3.2M, interior finishes at $2.8M, and site work at $1.5M. Costs assume standard-grade finishes and a 14-month construction schedule.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn house_trigger_sets_topic_and_selects_house_set() {
        let (set, context) = advance("Show me a house", &ConversationContext::default());
        assert_eq!(set.steps.len(), 4);
        assert_eq!(set.steps[2].tool, "generate_house_design");
        assert!(set.final_answer.contains("1,800 sq ft"));
        assert_eq!(context.topic, Some(Topic::House));
    }

    #[test]
    fn office_trigger_selects_office_set() {
        let (set, context) = advance("design an office building", &ConversationContext::default());
        assert!(set.steps.iter().any(|step| step.tool == "generate_office_layout"));
        assert!(set.final_answer.contains("$16 million"));
        assert_eq!(context.topic, Some(Topic::Office));
    }

    #[test]
    fn cost_follow_up_uses_active_topic() {
        let (_, context) = advance("show me a house", &ConversationContext::default());
        let (set, next) = advance("what is the cost", &context);
        assert_eq!(set.steps.len(), 1);
        assert_eq!(set.steps[0].tool, "calculate_cost");
        assert!(set.final_answer.contains("$325,000"));
        assert_eq!(next.topic, Some(Topic::House));
    }

    #[test]
    fn cost_without_topic_falls_back_to_default() {
        let (set, context) = advance("what is the cost", &ConversationContext::default());
        assert_eq!(set.steps[0].tool, "search_documents");
        assert_eq!(context.topic, None);
    }

    #[test]
    fn unmatched_query_keeps_existing_topic() {
        let context = ConversationContext { topic: Some(Topic::Office) };
        let (set, next) = advance("tell me something else", &context);
        assert_eq!(set.steps.len(), 3);
        assert_eq!(next.topic, Some(Topic::Office));
    }

    #[test]
    fn trigger_phrase_wins_over_follow_up_match() {
        let context = ConversationContext { topic: Some(Topic::House) };
        let (set, next) = advance("what would an office cost", &context);
        assert!(set.steps.iter().any(|step| step.tool == "calculate_construction_costs"));
        assert_eq!(next.topic, Some(Topic::Office));
    }
}
