// ==========================================
// 教务管理系统 - 表格类型识别器
// ==========================================
// 职责: 阶段 1 - 为 RawSheet 选择表头配置
// 算法: 逐候选计分（命中变体的标准表头数），严格最大者胜出；
//       并列取声明顺序靠前者；最高分为 0 → 未识别（正常结果，非异常）
// 纯函数，无副作用；同一 (表头, 候选) 输入恒得同一结果
// ==========================================

use crate::config::HeaderConfig;
use crate::domain::sheet::{CandidateExpectation, IdentifiedType};
use tracing::debug;

pub struct TypeIdentifier;

impl TypeIdentifier {
    /// 对单个候选计分
    ///
    /// # 返回
    /// - usize: 至少有一个表格表头命中其变体的标准表头数量
    pub fn score(headers: &[String], candidate: &HeaderConfig) -> usize {
        candidate
            .canonical_headers
            .iter()
            .filter(|canonical| candidate.canonical_header_matched(canonical, headers))
            .count()
    }

    /// 在候选集合中识别表格类型
    ///
    /// # 参数
    /// - headers: 表格首行表头
    /// - candidates: 候选配置（调用方限定的允许集合，声明顺序即并列优先序）
    ///
    /// # 返回
    /// - Some(IdentifiedType): score >= 1 且为严格最大
    /// - None: 所有候选得分为 0
    pub fn identify(headers: &[String], candidates: &[HeaderConfig]) -> Option<IdentifiedType> {
        let mut best: Option<(usize, &HeaderConfig)> = None;

        for candidate in candidates {
            let score = Self::score(headers, candidate);
            debug!(
                type_name = %candidate.type_name,
                score = score,
                "候选类型计分"
            );

            // 严格大于才替换: 并列时保留先声明者
            match best {
                Some((best_score, _)) if score <= best_score => {}
                _ if score == 0 => {}
                _ => best = Some((score, candidate)),
            }
        }

        best.map(|(score, config)| IdentifiedType {
            config: config.clone(),
            score,
        })
    }

    /// 各候选的期望表头清单（识别失败时的用户诊断）
    pub fn expectations(candidates: &[HeaderConfig]) -> Vec<CandidateExpectation> {
        candidates
            .iter()
            .map(|c| CandidateExpectation {
                type_name: c.type_name.clone(),
                expected_headers: c.canonical_headers.clone(),
            })
            .collect()
    }
}
