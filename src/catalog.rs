//! # Prompt Catalog Module
//!
//! Static, process-lifetime data describing each wizard variant: the ordered
//! chain of steps with their questions and option menus, the two prompt
//! templates sent to the model, and the section layout used to parse and
//! render the model's critique.
//!
//! Both variants share one [`Flow`] shape; only the data differs.

use std::collections::{HashMap, HashSet};

/// Menu label that lets the user type a custom answer at a menu step
pub const CUSTOM_INPUT_LABEL: &str = "✨ 직접 입력";
/// Start menu label that begins the wizard
pub const START_LABEL: &str = "✨ 시작하기";
/// Start menu label that shows the external guide link
pub const GUIDE_LABEL: &str = "📚 가이드";
/// Reply button shown after a successful run to re-send the result
pub const REPLAY_RESULT_LABEL: &str = "📄 결과 다시 보기";

/// External guide page linked from the start menu
pub const GUIDE_URL: &str = "http://starlenz.notion.site";

pub const START_MENU: &[&[&str]] = &[&[START_LABEL], &[GUIDE_LABEL]];

/// Help menu entries: button label and the page it links to
pub const HELP_LINKS: &[(&str, &str)] = &[
    ("📚 사용 가이드", "http://starlenz.notion.site"),
    ("💡 스크립트 작성 팁", "http://starlenz.notion.site"),
    ("🤝 관리자 연결", "https://t.me/starlenz_inc"),
    ("📊 트렌드 센터", "https://ads.tiktok.com/business/creativecenter/"),
    ("❓ 자주 묻는 질문", "http://starlenz.notion.site"),
];

/// Inline link buttons sent after a completed run, as rows of
/// (localization key of the label, URL)
pub const COMPLETION_LINKS: &[&[(&str, &str)]] = &[
    &[(
        "link-creative-center",
        "https://ads.tiktok.com/business/creativecenter/",
    )],
    &[
        (
            "link-share",
            "https://t.me/share/url?url=https://t.me/shortform_script_bot&text=✨숏폼 스크립트 작성 도우미✨",
        ),
        ("link-feedback", "tg://resolve?domain=shortform_feedback"),
    ],
];

/// One question of the wizard
#[derive(Debug, PartialEq)]
pub struct StepDefinition {
    /// Step identifier; also the answer key and the template placeholder name
    pub id: &'static str,
    /// Localization key of the question text
    pub question_key: &'static str,
    /// Fixed menu rows; `None` means free-text input
    pub options: Option<&'static [&'static [&'static str]]>,
    /// Successor step; `None` marks the terminal step
    pub next: Option<&'static str>,
}

impl StepDefinition {
    pub fn is_terminal(&self) -> bool {
        self.next.is_none()
    }

    /// Whether `input` is one of this step's menu labels
    pub fn offers(&self, input: &str) -> bool {
        self.options
            .map(|rows| rows.iter().flat_map(|row| row.iter()).any(|label| *label == input))
            .unwrap_or(false)
    }
}

/// System instruction and human-turn template for one model call
#[derive(Debug)]
pub struct PromptTemplate {
    pub system: &'static str,
    /// Human turn; `{name}` placeholders are filled from the answer record
    pub human: &'static str,
}

/// How a supplementary section is laid out by the renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SectionStyle {
    /// Sub-headings and bullets
    Bullets,
    /// Numbered list capped at `limit` entries, e.g. trending hashtags
    Ranked {
        limit: usize,
        intro: Option<&'static str>,
    },
}

/// A recognized section of the critique response
#[derive(Debug)]
pub struct SectionSpec {
    /// Heading title the model is asked to emit
    pub title: &'static str,
    /// Result field the section is stored under
    pub field: &'static str,
    /// Header line used when rendering
    pub header: &'static str,
    pub style: SectionStyle,
}

/// The primary artifact produced by the draft call
#[derive(Debug)]
pub struct PrimarySpec {
    pub field: &'static str,
    pub header: &'static str,
    pub placeholder: &'static str,
}

/// A complete wizard variant
#[derive(Debug)]
pub struct Flow {
    pub id: &'static str,
    pub entry_step: &'static str,
    pub steps: &'static [StepDefinition],
    /// First line of the rendered result
    pub headline: &'static str,
    pub primary: PrimarySpec,
    /// Stage 1: answers in, primary artifact out
    pub draft: PromptTemplate,
    /// Stage 2: primary artifact in, sectioned suggestions out
    pub critique: PromptTemplate,
    pub sections: &'static [SectionSpec],
}

impl Flow {
    /// Look up a registered flow by identifier
    pub fn by_id(id: &str) -> Option<&'static Flow> {
        [&SCRIPT_FLOW, &IDEAS_FLOW]
            .into_iter()
            .find(|flow| flow.id.eq_ignore_ascii_case(id.trim()))
    }

    pub fn step(&self, id: &str) -> Option<&'static StepDefinition> {
        self.steps.iter().find(|step| step.id == id)
    }

    pub fn entry(&self) -> Option<&'static StepDefinition> {
        self.step(self.entry_step)
    }

    /// Step identifiers in chain order, starting at the entry step
    pub fn chain(&self) -> Vec<&'static str> {
        let mut chain = Vec::new();
        let mut current = self.entry();
        while let Some(step) = current {
            if chain.contains(&step.id) {
                break;
            }
            chain.push(step.id);
            current = step.next.and_then(|next| self.step(next));
        }
        chain
    }

    /// Mapping from recognized section title to result field
    pub fn title_map(&self) -> HashMap<&'static str, &'static str> {
        self.sections
            .iter()
            .map(|section| (section.title, section.field))
            .collect()
    }

    /// Check that the chain is linear, covers every step, and that the
    /// templates only reference fields the chain produces
    pub fn validate(&self) -> Result<(), String> {
        let chain = self.chain();
        if chain.len() != self.steps.len() {
            return Err(format!(
                "flow {} chain reaches {} of {} steps",
                self.id,
                chain.len(),
                self.steps.len()
            ));
        }

        let last = chain
            .last()
            .and_then(|id| self.step(id))
            .ok_or_else(|| format!("flow {} has no entry step", self.id))?;
        if !last.is_terminal() {
            return Err(format!("flow {} does not terminate", self.id));
        }

        let known: HashSet<&str> = chain.iter().copied().collect();
        for name in crate::pipeline::placeholders(self.draft.human) {
            if !known.contains(name.as_str()) {
                return Err(format!("draft template references unknown field {name}"));
            }
        }
        for name in crate::pipeline::placeholders(self.critique.human) {
            if name != self.primary.field {
                return Err(format!("critique template references unknown field {name}"));
            }
        }

        Ok(())
    }
}

const CONTENT_TYPE_MENU: &[&[&str]] = &[
    &["🎭 코미디", "🎓 교육"],
    &["💄 뷰티", "✈️ 여행"],
    &["👗 패션", "🎮 챌린지"],
    &["📹 브이로그", "🎵 음악"],
    &["🍳 요리", "📢 사회적 이슈"],
    &[CUSTOM_INPUT_LABEL],
];

const TARGET_AUDIENCE_MENU: &[&[&str]] = &[
    &["👶 10대", "👩 20대"],
    &["👨 30대", "👴 40대"],
    &["👵 50대 이상"],
    &["👨 남성", "👩 여성"],
    &["🌏 국내", "🌍 해외", "🌎 글로벌"],
    &[CUSTOM_INPUT_LABEL],
];

const PLATFORM_MENU: &[&[&str]] = &[
    &["📱 TikTok"],
    &["📸 Instagram Reels"],
    &["🎥 YouTube Shorts"],
    &[CUSTOM_INPUT_LABEL],
];

const FORMAT_MENU: &[&[&str]] = &[
    &["🎭 스킷", "📚 튜토리얼"],
    &["⭐ 리뷰", "🎵 챌린지"],
    &["📹 브이로그", "🗣️ 토크"],
    &[CUSTOM_INPUT_LABEL],
];

const LENGTH_MENU: &[&[&str]] = &[
    &["⚡ 15초", "🕐 30초"],
    &["🕑 1분", "🕒 2분"],
    &[CUSTOM_INPUT_LABEL],
];

const VISUAL_MENU: &[&[&str]] = &[
    &["🎨 그래픽", "💬 자막"],
    &["🎭 필터", "🎵 배경음악"],
    &[CUSTOM_INPUT_LABEL],
];

const CATEGORY_MENU: &[&[&str]] = &[
    &["엔터테인먼트/예능", "교육/정보"],
    &["뷰티/패션", "여행/레저"],
    &["음식/요리", "게임/스포츠"],
    &["음악/댄스", "일상/브이로그"],
    &["반려동물", "테크/IT"],
    &["재테크/투자", "건강/운동"],
];

const AGE_MENU: &[&[&str]] = &[&["10대", "20대"], &["30대", "40대"], &["50대 이상"]];

const INTEREST_MENU: &[&[&str]] = &[
    &["트렌드/유행 정보", "실용적/생활 정보"],
    &["자기계발/성장", "취미/여가 활동"],
    &["쇼핑/소비", "건강/웰빙"],
    &["문화/예술", "소셜/커뮤니티"],
];

const IDEAS_PLATFORM_MENU: &[&[&str]] = &[
    &["TikTok"],
    &["Instagram Reels"],
    &["YouTube Shorts"],
    &[CUSTOM_INPUT_LABEL],
];

const HOOK_MENU: &[&[&str]] = &[
    &["충격적인 사실/반전", "궁금증 유발"],
    &["공감되는 상황", "유용한 정보/팁"],
    &["재미있는 연출", "시선 끄는 액션"],
    &["트렌디한 밈/챌린지", "감동/힐링"],
];

const SCRIPT_STEPS: &[StepDefinition] = &[
    StepDefinition {
        id: "content_type",
        question_key: "question-content-type",
        options: Some(CONTENT_TYPE_MENU),
        next: Some("target_audience"),
    },
    StepDefinition {
        id: "target_audience",
        question_key: "question-target-audience",
        options: Some(TARGET_AUDIENCE_MENU),
        next: Some("platform"),
    },
    StepDefinition {
        id: "platform",
        question_key: "question-platform",
        options: Some(PLATFORM_MENU),
        next: Some("trend_analysis"),
    },
    StepDefinition {
        id: "trend_analysis",
        question_key: "question-trend-analysis",
        options: None,
        next: Some("benchmark"),
    },
    StepDefinition {
        id: "benchmark",
        question_key: "question-benchmark",
        options: None,
        next: Some("benchmark_point"),
    },
    StepDefinition {
        id: "benchmark_point",
        question_key: "question-benchmark-point",
        options: None,
        next: Some("content_format"),
    },
    StepDefinition {
        id: "content_format",
        question_key: "question-content-format",
        options: Some(FORMAT_MENU),
        next: Some("content_topic"),
    },
    StepDefinition {
        id: "content_topic",
        question_key: "question-content-topic",
        options: None,
        next: Some("special_element"),
    },
    StepDefinition {
        id: "special_element",
        question_key: "question-special-element",
        options: None,
        next: Some("video_length"),
    },
    StepDefinition {
        id: "video_length",
        question_key: "question-video-length",
        options: Some(LENGTH_MENU),
        next: Some("visual_element"),
    },
    StepDefinition {
        id: "visual_element",
        question_key: "question-visual-element",
        options: Some(VISUAL_MENU),
        next: Some("storyline"),
    },
    StepDefinition {
        id: "storyline",
        question_key: "question-storyline",
        options: None,
        next: None,
    },
];

const IDEAS_STEPS: &[StepDefinition] = &[
    StepDefinition {
        id: "content_category",
        question_key: "question-content-category",
        options: Some(CATEGORY_MENU),
        next: Some("content_topic"),
    },
    StepDefinition {
        id: "content_topic",
        question_key: "question-idea-topic",
        options: None,
        next: Some("target_age"),
    },
    StepDefinition {
        id: "target_age",
        question_key: "question-target-age",
        options: Some(AGE_MENU),
        next: Some("target_interest"),
    },
    StepDefinition {
        id: "target_interest",
        question_key: "question-target-interest",
        options: Some(INTEREST_MENU),
        next: Some("platform"),
    },
    StepDefinition {
        id: "platform",
        question_key: "question-idea-platform",
        options: Some(IDEAS_PLATFORM_MENU),
        next: Some("hook_point"),
    },
    StepDefinition {
        id: "hook_point",
        question_key: "question-hook-point",
        options: Some(HOOK_MENU),
        next: None,
    },
];

const SCRIPT_DRAFT_SYSTEM: &str = "당신은 숏폼 콘텐츠 전문 작가입니다.
제공된 정보를 바탕으로 매력적인 숏폼 스크립트를 작성해주세요.

다음 형식을 정확히 따라주세요:

# 오프닝
[0:00-0:05]
[시청자의 관심을 끄는 강력한 후킹 문구]

# 메인 내용
[0:05-0:45]
[핵심 내용을 시간대별로 구성]
[각 시간대별 구체적인 대사와 액션]

# 클로징
[0:45-1:00]
[콜투액션과 마무리 멘트]

주의사항:
1. 시간대는 반드시 [시작-끝] 형식으로 표시
2. 각 섹션은 반드시 '# '으로 시작
3. 대사는 명확하고 간결하게
4. 시청자의 관심을 끌 수 있는 요소 포함
5. 플랫폼 특성에 맞는 톤앤매너 사용";

const SCRIPT_DRAFT_HUMAN: &str = "콘텐츠 유형: {content_type}
타겟: {target_audience}
플랫폼: {platform}
트렌드: {trend_analysis}
벤치마크: {benchmark}
벤치마크 포인트: {benchmark_point}
콘텐츠 형식: {content_format}
주제: {content_topic}
특별 요소: {special_element}
영상 길이: {video_length}
비주얼: {visual_element}
스토리라인: {storyline}";

const SCRIPT_CRITIQUE_SYSTEM: &str = "당신은 숏폼 콘텐츠 전문 컨설턴트입니다.

작성된 스크립트를 바탕으로 개선점과 제안사항을 제시해주세요.

다음 형식으로 응답해주세요:

# 후킹 문구 제안
- 대안 1: 더 강력한 후킹 문구
- 대안 2: 다른 접근 방식의 후킹 문구
- 대안 3: 트렌드를 활용한 후킹 문구

# 비주얼 요소 제안
- 화면 구성: 레이아웃과 구도
- 자막 활용: 효과적인 자막 배치
- 전환 효과: 추천 전환 효과
- 색감: 추천 색상 팔레트

# 트렌드 요소
- 해시태그: 추천 해시태그
- 음악: 추천 배경음악
- 효과음: 추천 효과음
- 필터: 추천 필터/효과

# 최적화 팁
- 타이밍: 시간 배분 조정
- 구성: 흐름 개선
- 강조점: 핵심 포인트
- 참고: 유사 콘텐츠 추천

주의사항:
1. 각 섹션은 반드시 '# '으로 시작
2. 모든 항목은 반드시 '- '으로 시작
3. 빈 줄은 섹션 구분에만 사용
4. 실제 트렌드와 성공 사례를 반영한 구체적인 제안";

const SCRIPT_CRITIQUE_HUMAN: &str = "스크립트: {script}";

const IDEAS_DRAFT_SYSTEM: &str = "당신은 숏폼 콘텐츠 기획 전문가입니다.
제공된 정보를 바탕으로 바로 촬영할 수 있는 숏폼 콘텐츠 아이디어 3개를 제안해주세요.

다음 형식을 정확히 따라주세요:

# 아이디어 1: [제목]
- 콘셉트: [한 문장 요약]
- 후킹 포인트: [첫 3초 연출]
- 전개: [핵심 장면 구성]

# 아이디어 2: [제목]
- 콘셉트: [한 문장 요약]
- 후킹 포인트: [첫 3초 연출]
- 전개: [핵심 장면 구성]

# 아이디어 3: [제목]
- 콘셉트: [한 문장 요약]
- 후킹 포인트: [첫 3초 연출]
- 전개: [핵심 장면 구성]

주의사항:
1. 각 아이디어는 반드시 '# '으로 시작
2. 모든 항목은 반드시 '- '으로 시작
3. 타겟 연령대와 관심사에 맞는 소재 사용
4. 플랫폼 특성에 맞는 길이와 톤앤매너 사용";

const IDEAS_DRAFT_HUMAN: &str = "카테고리: {content_category}
주제: {content_topic}
타겟 연령대: {target_age}
타겟 관심사: {target_interest}
플랫폼: {platform}
후킹포인트: {hook_point}";

const IDEAS_CRITIQUE_SYSTEM: &str = "당신은 숏폼 채널 성장 컨설턴트입니다.

제안된 콘텐츠 아이디어를 바탕으로 실행 전략을 제시해주세요.

다음 형식으로 응답해주세요:

# 제작 전략
- 촬영: [촬영 방법과 장비]
- 편집: [편집 포인트]
- 업로드: [최적 업로드 시간]

# 참여 유도 전략
- 댓글: [댓글을 유도하는 질문]
- 공유: [공유를 부르는 장치]
- 시리즈: [후속 콘텐츠 연결]

# 성장 전략
- 주기: [업로드 주기]
- 협업: [협업 아이디어]
- 분석: [확인할 지표]

# 트렌딩 해시태그
- [해시태그 1]
- [해시태그 2]
(10개까지, '#' 기호 없이)

주의사항:
1. 각 섹션은 반드시 '# '으로 시작
2. 모든 항목은 반드시 '- '으로 시작
3. 빈 줄은 섹션 구분에만 사용";

const IDEAS_CRITIQUE_HUMAN: &str = "아이디어: {ideas}";

const SCRIPT_SECTIONS: &[SectionSpec] = &[
    SectionSpec {
        title: "후킹 문구 제안",
        field: "hooks",
        header: "🎣 후킹 문구 제안:",
        style: SectionStyle::Bullets,
    },
    SectionSpec {
        title: "비주얼 요소 제안",
        field: "visual_suggestions",
        header: "🎨 비주얼 요소 제안:",
        style: SectionStyle::Bullets,
    },
    SectionSpec {
        title: "트렌드 요소",
        field: "trending_elements",
        header: "🔥 트렌드 요소:",
        style: SectionStyle::Bullets,
    },
    SectionSpec {
        title: "최적화 팁",
        field: "optimization_tips",
        header: "📈 최적화 팁:",
        style: SectionStyle::Bullets,
    },
];

const IDEAS_SECTIONS: &[SectionSpec] = &[
    SectionSpec {
        title: "제작 전략",
        field: "production_strategy",
        header: "🎬 콘텐츠 제작 전략:",
        style: SectionStyle::Bullets,
    },
    SectionSpec {
        title: "참여 유도 전략",
        field: "engagement_strategy",
        header: "🎯 참여 유도 전략:",
        style: SectionStyle::Bullets,
    },
    SectionSpec {
        title: "성장 전략",
        field: "growth_strategy",
        header: "📈 성장 전략:",
        style: SectionStyle::Bullets,
    },
    SectionSpec {
        title: "트렌딩 해시태그",
        field: "trending_hashtags",
        header: "🔥 틱톡 트렌딩 해시태그 TOP 10:",
        style: SectionStyle::Ranked {
            limit: 10,
            intro: Some("현재 틱톡에서 인기 있는 해시태그입니다:"),
        },
    },
];

/// Short-form script writing: twelve questions, then script + critique
pub static SCRIPT_FLOW: Flow = Flow {
    id: "script",
    entry_step: "content_type",
    steps: SCRIPT_STEPS,
    headline: "✨ 숏폼 스크립트가 준비되었습니다!",
    primary: PrimarySpec {
        field: "script",
        header: "🎬 숏폼 스크립트:",
        placeholder: "스크립트 생성 중...",
    },
    draft: PromptTemplate {
        system: SCRIPT_DRAFT_SYSTEM,
        human: SCRIPT_DRAFT_HUMAN,
    },
    critique: PromptTemplate {
        system: SCRIPT_CRITIQUE_SYSTEM,
        human: SCRIPT_CRITIQUE_HUMAN,
    },
    sections: SCRIPT_SECTIONS,
};

/// Content idea generation: six questions, then ideas + growth strategy
pub static IDEAS_FLOW: Flow = Flow {
    id: "ideas",
    entry_step: "content_category",
    steps: IDEAS_STEPS,
    headline: "✨ 콘텐츠 아이디어가 준비되었습니다!",
    primary: PrimarySpec {
        field: "ideas",
        header: "💡 추천 콘텐츠 아이디어:",
        placeholder: "아이디어 생성 중...",
    },
    draft: PromptTemplate {
        system: IDEAS_DRAFT_SYSTEM,
        human: IDEAS_DRAFT_HUMAN,
    },
    critique: PromptTemplate {
        system: IDEAS_CRITIQUE_SYSTEM,
        human: IDEAS_CRITIQUE_HUMAN,
    },
    sections: IDEAS_SECTIONS,
};
