//! Synthetic routing graphs shared by the integration tests.

#![allow(dead_code)]

use pipweave_common::Interner;
use pipweave_config::CampaignConfig;
use pipweave_fuzz::Campaign;
use pipweave_graph::parse_graph;

/// A `width` x `height` grid of `INT` tiles.
///
/// Each tile has a ring of four wires, a bidirectional chord, links to its
/// east and north neighbours, a constant wire feeding a clock-enable, and a
/// slice whose pins sit on two ends of the chord (so the chord routes
/// through the slice).
pub fn grid_graph(width: u32, height: u32) -> String {
    let mut text = String::from("# synthetic grid\n");
    for y in 0..height {
        for x in 0..width {
            let t = format!("INT_X{x}Y{y}");
            for i in 0..4 {
                let j = (i + 1) % 4;
                text.push_str(&format!("pip {t}/W{i}.W{j} 1 {t}/W{i} {t}/W{j}\n"));
            }
            text.push_str(&format!("pip {t}/W0.W2 0 {t}/W0 {t}/W2\n"));
            if x + 1 < width {
                let e = format!("INT_X{}Y{y}", x + 1);
                text.push_str(&format!("pip {t}/EE1 1 {t}/W1 {e}/W3\n"));
            }
            if y + 1 < height {
                let n = format!("INT_X{x}Y{}", y + 1);
                text.push_str(&format!("pip {t}/NN1 1 {t}/W3 {n}/W1\n"));
            }
            text.push_str(&format!("pip {t}/VCC.W3 1 {t}/VCC_WIRE {t}/W3\n"));
            text.push_str(&format!("extpip {t} {t}/W2 {t}/OUT\n"));
            text.push_str(&format!("pin SLICE_X{x}Y{y}/A_O {t}/W0\n"));
            text.push_str(&format!("pin SLICE_X{x}Y{y}/CQ {t}/W1\n"));
            text.push_str(&format!("pin SLICE_X{x}Y{y}/B3 {t}/W2\n"));
            text.push_str(&format!("pin SLICE_X{x}Y{y}/D6 {t}/OUT\n"));
            text.push_str(&format!("pin BUFCE_ROW_X{x}Y{y}/CE_INT {t}/W3\n"));
        }
    }
    text
}

/// A small, fast configuration.
pub fn config(slots: usize) -> CampaignConfig {
    let mut config = CampaignConfig::default();
    config.design.slots = slots;
    config.design.disable_probability = 0.05;
    config
}

/// Parses `text` and starts a campaign over it.
pub fn campaign(text: &str, config: CampaignConfig, seed: u64) -> Campaign {
    let mut interner = Interner::new();
    let graph = parse_graph(text.as_bytes(), &mut interner).unwrap();
    Campaign::new(graph, interner, config, seed).unwrap()
}
