//! # Generation Pipeline Tests
//!
//! End-to-end runs of the two-stage pipeline against a scripted generator,
//! followed by rendering of the produced result.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use shortform_bot::catalog::{
    Flow, PrimarySpec, PromptTemplate, SectionSpec, SectionStyle, StepDefinition, SCRIPT_FLOW,
};
use shortform_bot::dialogue::AnswerRecord;
use shortform_bot::errors::BotError;
use shortform_bot::generator::{GenerationRequest, TextGenerator};
use shortform_bot::pipeline::{GenerationPipeline, DEFAULT_MAX_TOKENS};
use shortform_bot::render::{render, RENDER_APOLOGY};

static TEST_STEPS: &[StepDefinition] = &[
    StepDefinition {
        id: "category",
        question_key: "question-content-category",
        options: None,
        next: Some("topic"),
    },
    StepDefinition {
        id: "topic",
        question_key: "question-idea-topic",
        options: None,
        next: Some("age"),
    },
    StepDefinition {
        id: "age",
        question_key: "question-target-age",
        options: None,
        next: None,
    },
];

static TEST_SECTIONS: &[SectionSpec] = &[
    SectionSpec {
        title: "후킹 문구 제안",
        field: "hooks",
        header: "🎣 후킹 문구 제안:",
        style: SectionStyle::Bullets,
    },
    SectionSpec {
        title: "최적화 팁",
        field: "optimization_tips",
        header: "📈 최적화 팁:",
        style: SectionStyle::Bullets,
    },
];

static TEST_FLOW: Flow = Flow {
    id: "test",
    entry_step: "category",
    steps: TEST_STEPS,
    headline: "✨ 테스트 결과",
    primary: PrimarySpec {
        field: "script",
        header: "🎬 숏폼 스크립트:",
        placeholder: "스크립트 생성 중...",
    },
    draft: PromptTemplate {
        system: "draft system",
        human: "카테고리: {category}\n주제: {topic}\n연령: {age}",
    },
    critique: PromptTemplate {
        system: "critique system",
        human: "스크립트:\n{script}",
    },
    sections: TEST_SECTIONS,
};

/// Generator that replays canned responses and records every request
struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<Option<String>>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    fn new(responses: Vec<Result<Option<String>>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<Option<String>> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("no scripted response left")))
    }
}

fn answers() -> AnswerRecord {
    [("category", "교육/정보"), ("topic", "공부법"), ("age", "20대")]
        .into_iter()
        .collect()
}

fn pipeline(generator: Arc<ScriptedGenerator>) -> GenerationPipeline {
    GenerationPipeline::new(generator, DEFAULT_MAX_TOKENS)
}

#[tokio::test]
async fn test_two_stage_run_produces_rendered_result() -> Result<()> {
    let generator = ScriptedGenerator::new(vec![
        Ok(Some("# 오프닝\n[0:00-0:05]\n후킹 문구".to_string())),
        Ok(Some("# 후킹 문구 제안\n- 대안1: 더 강한 문구".to_string())),
    ]);

    let result = pipeline(generator.clone()).run(&TEST_FLOW, &answers()).await?;

    assert_eq!(result.primary, "# 오프닝\n[0:00-0:05]\n후킹 문구");
    assert_eq!(
        result.field("hooks"),
        &["# 대안1".to_string(), "- 더 강한 문구".to_string()]
    );
    assert!(result.field("optimization_tips").is_empty());

    let requests = generator.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].system, "draft system");
    assert_eq!(requests[0].prompt, "카테고리: 교육/정보\n주제: 공부법\n연령: 20대");
    assert_eq!(requests[0].max_tokens, DEFAULT_MAX_TOKENS);
    assert_eq!(
        requests[1].prompt,
        "스크립트:\n# 오프닝\n[0:00-0:05]\n후킹 문구"
    );

    let text = render(&TEST_FLOW, Some(&result));
    assert!(text.starts_with("✨ 테스트 결과"));
    assert!(text.contains("📍 오프닝"));
    assert!(text.contains("  [0:00-0:05]"));
    assert!(text.contains("🎣 후킹 문구 제안:"));
    assert!(text.contains("📍 대안1"));
    assert!(text.contains("• 더 강한 문구"));
    assert!(!text.contains("📈 최적화 팁:"));
    Ok(())
}

#[tokio::test]
async fn test_critique_without_headings_leaves_supplements_empty() -> Result<()> {
    let generator = ScriptedGenerator::new(vec![
        Ok(Some("스크립트 본문".to_string())),
        Ok(Some("좋은 스크립트입니다.\n- 그대로 사용하세요".to_string())),
    ]);

    let result = pipeline(generator).run(&TEST_FLOW, &answers()).await?;

    assert!(result.supplements_empty());
    let text = render(&TEST_FLOW, Some(&result));
    assert!(!text.contains("🎣 후킹 문구 제안:"));
    assert!(!text.contains("📈 최적화 팁:"));
    assert!(text.contains("  스크립트 본문"));
    Ok(())
}

#[tokio::test]
async fn test_draft_failure_skips_critique() {
    let generator = ScriptedGenerator::new(vec![Err(anyhow!("connection reset"))]);

    let err = pipeline(generator.clone())
        .run(&TEST_FLOW, &answers())
        .await
        .unwrap_err();

    assert!(matches!(err, BotError::GenerationFailed(_)));
    assert_eq!(generator.requests().len(), 1);
}

#[tokio::test]
async fn test_empty_responses_fail_generation() {
    for draft in [None, Some("   \n".to_string())] {
        let generator = ScriptedGenerator::new(vec![Ok(draft)]);
        let err = pipeline(generator)
            .run(&TEST_FLOW, &answers())
            .await
            .unwrap_err();
        assert!(matches!(err, BotError::GenerationFailed(_)));
    }

    let generator = ScriptedGenerator::new(vec![Ok(Some("draft".to_string())), Ok(None)]);
    let err = pipeline(generator)
        .run(&TEST_FLOW, &answers())
        .await
        .unwrap_err();
    assert!(matches!(err, BotError::GenerationFailed(_)));
}

#[tokio::test]
async fn test_missing_answer_is_reported_before_any_call() {
    let generator = ScriptedGenerator::new(vec![]);
    let partial: AnswerRecord = [("category", "교육"), ("topic", "공부법")]
        .into_iter()
        .collect();

    let err = pipeline(generator.clone())
        .run(&TEST_FLOW, &partial)
        .await
        .unwrap_err();

    assert_eq!(err, BotError::MissingField("age".to_string()));
    assert!(generator.requests().is_empty());
}

#[tokio::test]
async fn test_answers_with_braces_are_inserted_verbatim() -> Result<()> {
    let generator = ScriptedGenerator::new(vec![
        Ok(Some("draft".to_string())),
        Ok(Some("# 최적화 팁\n- 짧게".to_string())),
    ]);
    let tricky: AnswerRecord = [("category", "{topic}"), ("topic", "공부법"), ("age", "20대")]
        .into_iter()
        .collect();

    let result = pipeline(generator.clone()).run(&TEST_FLOW, &tricky).await?;

    assert!(generator.requests()[0].prompt.starts_with("카테고리: {topic}\n"));
    assert_eq!(result.field("optimization_tips"), &["- 짧게".to_string()]);
    Ok(())
}

#[tokio::test]
async fn test_script_flow_end_to_end() -> Result<()> {
    let generator = ScriptedGenerator::new(vec![
        Ok(Some("# 오프닝\n안녕하세요".to_string())),
        Ok(Some(
            "# 비주얼 요소 제안\n- 자막: 큰 글씨\n# 알 수 없는 섹션\n- 무시됨".to_string(),
        )),
    ]);
    let answers: AnswerRecord = SCRIPT_FLOW
        .chain()
        .into_iter()
        .map(|step| (step, "답변"))
        .collect();

    let result = pipeline(generator).run(&SCRIPT_FLOW, &answers).await?;
    let text = render(&SCRIPT_FLOW, Some(&result));

    assert!(text.contains("🎨 비주얼 요소 제안:"));
    assert!(text.contains("📍 자막"));
    assert!(!text.contains("무시됨"));
    assert_ne!(text, RENDER_APOLOGY);
    Ok(())
}
