//! 默认提示词
//!
//! 两个模板都可以被调用方覆盖；恢复默认值时必须与这里逐字节一致。

/// QA 生成模板中用于替换文本块内容的占位符
pub const TEXT_PLACEHOLDER: &str = "{text_content}";

/// 默认的 SFT 系统提示词
pub const DEFAULT_SFT_SYSTEM_PROMPT: &str = "你是一個有用的AI助手。";

/// 第一阶段：QA 生成提示词
pub const DEFAULT_QA_PROMPT: &str = r#"基於以下給定的文本，生成多組高質量的問答對。請遵循以下指南：

1. 問題部分：
- 為不同的主題和概念創建多個問答對
- 每個問題應考慮用戶可能的多種問法，例如：
- 直接詢問（如"什麼是...？"）
- 請求確認（如"是否可以說...？"）
- 尋求解釋（如"請解釋一下...的含義。"）
- 假設性問題（如"如果...會怎樣？"）
- 例子請求（如"能否舉個例子說明...？"）
- 問題應涵蓋文本中的關鍵信息、主要概念和細節，確保不遺漏重要內容。

2. 答案部分：
- 提供一個全面、信息豐富的答案，涵蓋問題的所有可能角度，確保邏輯連貫。
- 答案應直接基於給定文本，確保準確性和一致性。
- 包含相關的細節，如日期、名稱、職位等具體信息，必要時提供背景信息以增強理解。

3. 格式：
- 使用 "Q:" 標記每個問題的開始
- 使用 "A:" 標記對應答案的開始
- 問答對之間用兩個空行分隔

4. 內容要求：
- 確保問答對緊密圍繞文本主題，避免偏離主題。
- 避免添加文本中未提及的信息，確保信息的真實性。

給定文本：
{text_content}

請基於這個文本生成多個問答對。"#;

/// 第二阶段：JSON 转换系统提示词
pub const DEFAULT_JSON_SYSTEM_PROMPT: &str = r#"你是一個JSON格式轉換專家。將原始問答對文本轉換為標準JSON數組，每個問題必須成為獨立的QA對。

CRITICAL RULES:
- ONLY output valid JSON array format: [...]
- SEPARATE each question into individual QA pairs
- If one "Q:" contains multiple questions, split them into separate objects
- Each question gets its own JSON object with the same answer
- NO explanations, comments, or additional text
- NO markdown code blocks

TASK:
1. Find all Q: and A: pairs
2. If Q: contains multiple questions (separated by newlines), create separate QA pairs for each
3. Each question should be paired with the corresponding answer

EXAMPLE:
If input has: Q: Question1? Question2? Question3? A: Answer content
Output: [
  {"question": "Question1?", "answer": "Answer content"},
  {"question": "Question2?", "answer": "Answer content"},
  {"question": "Question3?", "answer": "Answer content"}
]"#;

/// 用占位符替换文本块内容
///
/// 只替换 `{text_content}`，模板中的其他花括号原样保留
pub fn render_qa_prompt(template: &str, text: &str) -> String {
    template.replace(TEXT_PLACEHOLDER, text)
}

/// 构建第二阶段的用户消息
pub fn render_structuring_input(raw_response: &str) -> String {
    format!("INPUT TEXT:\n{}\n\nJSON OUTPUT:", raw_response)
}
