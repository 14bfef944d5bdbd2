//! # Section Parser and Renderer Tests
//!
//! Properties that hold across parsing model output and rendering it back.

use std::collections::HashMap;

use shortform_bot::catalog::{IDEAS_FLOW, SCRIPT_FLOW};
use shortform_bot::pipeline::GenerationResult;
use shortform_bot::render::{render, render_entries, RENDER_APOLOGY};
use shortform_bot::sections::{parse_entries, parse_sections};

fn title_map() -> HashMap<&'static str, &'static str> {
    SCRIPT_FLOW.title_map()
}

/// Undo the display decoration so rendered entries can be parsed again
fn strip_decoration(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .map(|line| line.trim_start_matches('\n'))
        .map(|line| {
            if let Some(title) = line.strip_prefix("📍 ") {
                format!("# {title}")
            } else if let Some(item) = line.strip_prefix("• ") {
                format!("- {item}")
            } else {
                line.to_string()
            }
        })
        .collect()
}

#[test]
fn test_parse_render_parse_is_stable() {
    let samples = [
        "# 후킹 문구 제안\n- 대안1: 더 강한 문구\n- 대안2: 질문으로 시작\n그냥 문장",
        "# 최적화 팁\n- 자막을 크게\n- 해시태그: 3개 이하",
        "# 트렌드 요소\n챌린지 음원 사용\n- 밈: 요즘 유행하는 밈",
    ];

    for sample in samples {
        let sections = parse_sections(sample, &title_map());
        assert_eq!(sections.len(), 1, "sample should yield one section: {sample}");

        for entries in sections.values() {
            let rendered = render_entries(entries);
            let stripped = strip_decoration(&rendered);
            let reparsed = parse_entries(stripped.iter().map(String::as_str));
            assert_eq!(&reparsed, entries);
        }
    }
}

#[test]
fn test_unknown_titles_never_appear() {
    let raw = "# 알 수 없는 섹션\n- 비밀\n# 최적화 팁\n- 공개";
    let sections = parse_sections(raw, &title_map());

    assert_eq!(sections.len(), 1);
    assert_eq!(sections["optimization_tips"], vec!["- 공개".to_string()]);

    let mut result = GenerationResult::empty(&SCRIPT_FLOW);
    result.primary = "본문".to_string();
    result.fields.extend(sections);
    let text = render(&SCRIPT_FLOW, Some(&result));
    assert!(!text.contains("비밀"));
    assert!(!text.contains("알 수 없는 섹션"));
    assert!(text.contains("• 공개"));
}

#[test]
fn test_empty_result_renders_headline_and_placeholder_only() {
    let result = GenerationResult::empty(&SCRIPT_FLOW);
    let text = render(&SCRIPT_FLOW, Some(&result));

    let expected = format!(
        "{}\n\n{}\n  {}",
        SCRIPT_FLOW.headline, SCRIPT_FLOW.primary.header, SCRIPT_FLOW.primary.placeholder
    );
    assert_eq!(text, expected);
    for section in SCRIPT_FLOW.sections {
        assert!(!text.contains(section.header));
    }
}

#[test]
fn test_sections_render_in_flow_order() {
    let raw = "# 최적화 팁\n- 마지막\n# 후킹 문구 제안\n- 처음";
    let mut result = GenerationResult::empty(&SCRIPT_FLOW);
    result.primary = "본문".to_string();
    result.fields.extend(parse_sections(raw, &title_map()));

    let text = render(&SCRIPT_FLOW, Some(&result));
    let hooks = text.find("🎣 후킹 문구 제안:").unwrap();
    let tips = text.find("📈 최적화 팁:").unwrap();
    assert!(hooks < tips);
}

#[test]
fn test_later_duplicate_section_wins() {
    let raw = "# 최적화 팁\n- 첫 번째\n# 최적화 팁\n- 두 번째";
    let sections = parse_sections(raw, &title_map());
    assert_eq!(sections["optimization_tips"], vec!["- 두 번째".to_string()]);
}

#[test]
fn test_ideas_result_with_hashtags() {
    let raw = "# 성장 전략\n- 꾸준한 업로드\n# 트렌딩 해시태그\n- #fyp\n- #공부";
    let mut result = GenerationResult::empty(&IDEAS_FLOW);
    result.primary = "# 아이디어 1\n- 설명".to_string();
    result
        .fields
        .extend(parse_sections(raw, &IDEAS_FLOW.title_map()));

    let text = render(&IDEAS_FLOW, Some(&result));
    assert!(text.contains("📍 아이디어 1"));
    assert!(text.contains("📈 성장 전략:"));
    assert!(text.contains("1. #fyp"));
    assert!(text.contains("2. #공부"));
}

#[test]
fn test_missing_result_apologizes() {
    assert_eq!(render(&IDEAS_FLOW, None), RENDER_APOLOGY);
}
