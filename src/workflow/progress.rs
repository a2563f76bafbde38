//! 运行进度
//!
//! 第一阶段占 [0, 0.5]，第二阶段占 [0.5, 1.0]。
//! 进度值每次都由计数重新计算，不做浮点累加，阶段结束时恰好是 0.5 / 1.0。

/// 单调不减的进度值
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineProgress {
    generation_total: usize,
    generation_done: usize,
    structuring_total: usize,
    structuring_done: usize,
    value: f64,
}

impl PipelineProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn start_generation(&mut self, total: usize) {
        self.generation_total = total;
        self.generation_done = 0;
    }

    /// 一个文本块处理完毕（无论成功与否）
    pub fn complete_generation_item(&mut self) {
        self.generation_done = (self.generation_done + 1).min(self.generation_total);
        let value = self.generation_done as f64 / (2 * self.generation_total) as f64;
        self.advance_to(value);
    }

    /// 第一阶段结束，文本块数为 0 时同样到达 0.5
    pub fn finish_generation(&mut self) {
        self.advance_to(0.5);
    }

    pub fn start_structuring(&mut self, total: usize) {
        self.structuring_total = total;
        self.structuring_done = 0;
    }

    /// 一条原始响应处理完毕（无论成功与否）
    pub fn complete_structuring_item(&mut self) {
        self.structuring_done = (self.structuring_done + 1).min(self.structuring_total);
        let value = 0.5 + self.structuring_done as f64 / (2 * self.structuring_total) as f64;
        self.advance_to(value);
    }

    pub fn finish(&mut self) {
        self.advance_to(1.0);
    }

    fn advance_to(&mut self, value: f64) {
        if value.is_finite() {
            self.value = self.value.max(value.clamp(0.0, 1.0));
        }
    }
}
