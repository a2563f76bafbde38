use std::fmt::Display;

/// 流水线状态
///
/// 严格按顺序前进，没有分支也不会回退；`Done` 为终态
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PipelineState {
    Idle,
    ChunkingComplete,
    Stage1Running,
    Stage1Complete,
    Stage2Running,
    Done,
}

impl PipelineState {
    /// 下一个状态，`Done` 之后没有状态
    pub fn next(self) -> Option<Self> {
        match self {
            PipelineState::Idle => Some(PipelineState::ChunkingComplete),
            PipelineState::ChunkingComplete => Some(PipelineState::Stage1Running),
            PipelineState::Stage1Running => Some(PipelineState::Stage1Complete),
            PipelineState::Stage1Complete => Some(PipelineState::Stage2Running),
            PipelineState::Stage2Running => Some(PipelineState::Done),
            PipelineState::Done => None,
        }
    }
}

impl Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PipelineState::Idle => "Idle",
            PipelineState::ChunkingComplete => "ChunkingComplete",
            PipelineState::Stage1Running => "Stage1Running",
            PipelineState::Stage1Complete => "Stage1Complete",
            PipelineState::Stage2Running => "Stage2Running",
            PipelineState::Done => "Done",
        };
        f.write_str(name)
    }
}
