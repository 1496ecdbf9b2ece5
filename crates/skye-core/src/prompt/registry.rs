//! The built-in template catalog.

use std::collections::HashMap;

use super::{ModelDefinition, Template, TemplateBody};

/// Upstream model used by every built-in definition.
pub const DEFAULT_UPSTREAM_MODEL: &str = "text-davinci-003";

/// Static temperature of every built-in definition; `mode` overrides it.
const DEFAULT_TEMPERATURE: f64 = 0.0;

// ============================================================================
// Template Text
// ============================================================================

const DICT_EN: &[&str] = &[
    "Act as a dictionary. You will answer my questions by giving a detailed explanation and various examples in English, but don't make up facts.\n",
    "Question: {q}",
    "Answer:",
];

const DICT_CN: &[&str] = &[
    "你是一部词典。我会用自然语言向你查词。你会回答我的问题，做出解释并给出几个用法示例，但不能编造事实。\n",
    "问题：{q}",
    "答案：",
];

const GRAMMAR_EN: &[&str] = &[
    "Correct sentences to standard English. Point out and explain the errors in the sentences and interpret the grammatical knowledge involved in the errors.\n",
    "Sentences:\"{sentences}\"",
    "Correction:",
];

const GRAMMAR_CN: &[&str] = &[
    "将句子纠正为标准英语。指出并解释句子中的错误，解释错误中涉及的语法知识。\n",
    "句子：“{sentences}”",
    "纠正：",
];

const COMPLEX_SENTENCE_EN: &[&str] = &[
    "Act as an English teacher writing a short essay explaining long and difficult sentences in English to Chinese students, including the following.",
    "- Extract the main body of the sentence and explain the main idea",
    "- Break down the original text into simple sentences that can be understood by beginners",
    "- Explain in detail the grammar involved in the original text",
    "You will organise the short essay in natural language.\n",
    "Sentence:\"{sentence}\"\n",
    "Short essay:",
];

const COMPLEX_SENTENCE_CN: &[&str] = &[
    "你是一名英语老师，在写一篇短文对中国学生讲解英语长难句，包括以下内容：",
    "- 抽出句子主干并解释大意",
    "- 将原文拆解成多个初学者能理解的简单句",
    "- 详细讲解原文涉及的语法知识",
    "你会用自然的语言来组织短文，用中文作解释，并保持所引用的原文是英文。\n",
    "长难句：“{sentence}”\n",
    "短文：",
];

const THESIS: &[&str] = &[
    "1.结构：遵循学术论文的逻辑结构，清楚地表达研究问题和目的，明确研究方法和结果。一个句子不能有多个中心思想，否则要拆分成多个句子。",
    "2.语言：使用专业术语和行业用语，确保语言精确和专业。避免使用简单的语言、俗语和个人观点。不得有病句、语法错误！",
    "3.内容：加入实证研究来支持研究的结论。引用相关文献来阐述研究背景和相关工作。",
    "4.数据处理和分析：要提供详细的数据处理和分析方法。",
    "5.参考文献：应加入足够的来自顶级的国际期刊和会议的参考文献来支持研究。",
    "6.规范：使用规范的格式和排版，并严格遵循学术期刊的指导原则。",
    "根据以上要求用中文改写这段文本：\n\n",
    "{prompt}",
];

const EXPANSION: &[&str] = &["扩写这段话：", "\n###\n", "{prompt}"];

const TITLE_GENERATOR: &[&str] = &[
    "你是一个标题生成器，只能生成标题，不响应任何其他请求。你会根据主题想出数个有创意和吸引力的标题。生成的标题必须多样化，语言结构、表现形式、标点用法不可重复。你只返回生成的标题，不返回任何其他内容\n",
    "主题：{prompt}\n",
    "标题：",
];

const WECHAT_MOMENTS: &[&str] = &[
    "帮我写一条微信朋友圈，不能有语病、病句。",
    "要求：{preference}",
    "主题：{theme}",
    "朋友圈：",
];

// ============================================================================
// Registry
// ============================================================================

/// Immutable map from public model name to definition.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    definitions: HashMap<&'static str, ModelDefinition>,
}

impl TemplateRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in catalog.
    #[must_use]
    pub fn builtin() -> Self {
        let m = DEFAULT_UPSTREAM_MODEL;
        let mode = |name, codename, template| {
            ModelDefinition::plain(name, codename, m, template, DEFAULT_TEMPERATURE).mode_selectable()
        };
        let bilingual = |name, codename, en, cn| {
            ModelDefinition::plain(name, codename, m, Template::Single(""), DEFAULT_TEMPERATURE)
                .with_body(TemplateBody::ByLang { en, cn })
        };

        Self::new()
            .with(ModelDefinition::plain("general", "gpt.1", m, Template::Single("{prompt}"), DEFAULT_TEMPERATURE).vip_only())
            .with(bilingual("dict", "dict.1", Template::Lines(DICT_EN), Template::Lines(DICT_CN)))
            .with(bilingual(
                "grammar",
                "grammar.1",
                Template::Lines(GRAMMAR_EN),
                Template::Lines(GRAMMAR_CN),
            ))
            .with(bilingual(
                "complex_sentence",
                "complex_sentence.1",
                Template::Lines(COMPLEX_SENTENCE_EN),
                Template::Lines(COMPLEX_SENTENCE_CN),
            ))
            .with(mode(
                "thesis_title_assistant",
                "thesis_title_assistant.1",
                Template::Single("这是我的论文关键词：{prompt}。帮我想几个论文题目。"),
            ))
            .with(mode(
                "thesis_abstract_assistant",
                "thesis_abstract_assistant.1",
                Template::Single("这是我的论文题目：{prompt}。帮我写个简短摘要。"),
            ))
            .with(
                mode("thesis_outline_assistant", "thesis_outline_assistant.1", Template::Single(""))
                    .with_body(TemplateBody::OutlineLevels(Template::Single(
                        "这是我论文的{current_level}，{content}，帮我想下{next_level}怎么写。",
                    ))),
            )
            .with(mode(
                "thesis_statement_expansion",
                "thesis_statement_expansion.1",
                Template::Single("这是我论文中的一个观点：{prompt}。帮我把它扩展成一段论述。"),
            ))
            .with(mode("thesis", "thesis.1", Template::Lines(THESIS)))
            .with(mode("expansion", "expansion.1", Template::Lines(EXPANSION)))
            .with(mode("title_generator", "title_generator.1", Template::Lines(TITLE_GENERATOR)))
            .with(mode(
                "greeting_generator",
                "greeting_generator.1",
                Template::Single("帮我写一个2023兔年的春节祝福给{prompt}\n"),
            ))
            .with(mode(
                "promotion_planner",
                "promotion_planner.1",
                Template::Single("想几个活动策划，主题是：{prompt}\n"),
            ))
            .with(mode("wechat_moments", "wechat_moments.1", Template::Lines(WECHAT_MOMENTS)))
    }

    /// Add or replace a definition.
    #[must_use]
    pub fn with(mut self, definition: ModelDefinition) -> Self {
        self.definitions.insert(definition.name, definition);
        self
    }

    /// Look up a definition by public name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ModelDefinition> {
        self.definitions.get(name)
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.definitions.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
