// ==========================================
// 教务管理系统 - 导入会话编排
// ==========================================
// 职责: 整合导入流程（单次导入尝试的全部状态）
// 流程: 解码 → 类型识别 → 行映射 → DQ 校验 → 预览编辑 → 变换 → 上传
// 状态机: Idle → Uploading → {Success, Error}
//   - Uploading 期间拒绝再次提交（单飞行上传）
//   - Error 停留在预览步骤，已编辑记录原样保留供重试
//   - 上传前各类错误回到文件选择步骤（会话状态清空）
// 并发模型: 单线程协作式；仅文件解码与上传两个挂起点
// ==========================================

use crate::config::{HeaderConfigRegistry, ImportPolicy};
use crate::domain::record::{Batch, DqSummary, DqViolation, ImportBatch, MappedRecord};
use crate::domain::sheet::{IdentifiedType, RawSheet};
use crate::domain::types::{RecordType, UploadState};
use crate::importer::dq_validator::DqValidator;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::row_mapper::RowMapper;
use crate::importer::sheet_reader::{SheetReader, UniversalReader};
use crate::importer::transformer::Transformer;
use crate::importer::type_identifier::TypeIdentifier;
use crate::importer::uploader::{BatchUploader, GroupOutcome, UploadReport};
use chrono::{NaiveDate, Utc};
use futures::future::{AbortHandle, AbortRegistration, Abortable, Aborted};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

// ==========================================
// InspectionOutcome - 检视结果（预览步骤的数据）
// ==========================================
#[derive(Debug, Clone)]
pub struct InspectionOutcome {
    pub batch: ImportBatch,
    pub type_name: String,
    pub score: usize,
    pub records: Vec<MappedRecord>,
    pub violations: Vec<DqViolation>,
    pub summary: DqSummary,
}

// ==========================================
// ImportSession - 导入会话
// ==========================================
pub struct ImportSession {
    registry: HeaderConfigRegistry,
    policy: ImportPolicy,
    reader: Box<dyn SheetReader>,
    uploader: Arc<dyn BatchUploader>,

    // 测试注入的固定"当前日期"（None = 取本地时钟）
    fixed_today: Option<NaiveDate>,

    // 会话状态
    batch_id: String,
    state: UploadState,
    identified: Option<IdentifiedType>,
    previews: Vec<MappedRecord>,
    violations: Vec<DqViolation>,
    last_report: Option<UploadReport>,
}

impl ImportSession {
    pub fn new(
        registry: HeaderConfigRegistry,
        policy: ImportPolicy,
        uploader: Arc<dyn BatchUploader>,
    ) -> Self {
        Self {
            registry,
            policy,
            reader: Box::new(UniversalReader),
            uploader,
            fixed_today: None,
            batch_id: Uuid::new_v4().to_string(),
            state: UploadState::Idle,
            identified: None,
            previews: Vec::new(),
            violations: Vec::new(),
            last_report: None,
        }
    }

    /// 替换读取器（测试/特殊格式）
    pub fn with_reader(mut self, reader: Box<dyn SheetReader>) -> Self {
        self.reader = reader;
        self
    }

    /// 固定"当前日期"（日期回退可测性）
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.fixed_today = Some(today);
        self
    }

    fn today(&self) -> NaiveDate {
        self.fixed_today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    // ===== 访问器 =====

    pub fn batch_id(&self) -> &str {
        &self.batch_id
    }

    pub fn state(&self) -> UploadState {
        self.state
    }

    pub fn identified_type(&self) -> Option<&IdentifiedType> {
        self.identified.as_ref()
    }

    /// 当前可编辑预览记录
    pub fn records(&self) -> &[MappedRecord] {
        &self.previews
    }

    pub fn violations(&self) -> &[DqViolation] {
        &self.violations
    }

    pub fn last_upload_report(&self) -> Option<&UploadReport> {
        self.last_report.as_ref()
    }

    // ===== 阶段 0-3: 检视（解码 → 识别 → 映射 → 校验 → 预览）=====

    /// 从文件路径检视
    ///
    /// # 参数
    /// - path: 表格文件路径（.xlsx/.xls/.csv）
    /// - allowed: 候选类型白名单（None = 全量注册表；类型锁定页传单元素）
    pub fn inspect_path(
        &mut self,
        path: &Path,
        allowed: Option<&[&str]>,
    ) -> ImportResult<InspectionOutcome> {
        let sheet = match self.reader.read_path(path) {
            Ok(sheet) => sheet,
            Err(e) => {
                self.reset_to_file_selection();
                return Err(e);
            }
        };
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string);
        self.inspect_sheet(sheet, file_name, allowed)
    }

    /// 从原始字节检视
    pub fn inspect_bytes(
        &mut self,
        bytes: &[u8],
        file_name: Option<String>,
        allowed: Option<&[&str]>,
    ) -> ImportResult<InspectionOutcome> {
        let sheet = match self.reader.read_bytes(bytes) {
            Ok(sheet) => sheet,
            Err(e) => {
                self.reset_to_file_selection();
                return Err(e);
            }
        };
        self.inspect_sheet(sheet, file_name, allowed)
    }

    /// 检视已解码表格
    pub fn inspect_sheet(
        &mut self,
        sheet: RawSheet,
        file_name: Option<String>,
        allowed: Option<&[&str]>,
    ) -> ImportResult<InspectionOutcome> {
        let start_time = Instant::now();
        info!(
            batch_id = %self.batch_id,
            file_name = file_name.as_deref().unwrap_or("<bytes>"),
            total_rows = sheet.row_count(),
            "开始检视表格"
        );

        match self.inspect_inner(&sheet, allowed) {
            Ok((identified, records, violations)) => {
                let summary = DqSummary::from_violations(records.len(), &violations);
                let batch = ImportBatch {
                    batch_id: self.batch_id.clone(),
                    file_name,
                    type_name: Some(identified.type_name().to_string()),
                    total_rows: sheet.row_count(),
                    mapped_rows: records.len(),
                    imported_at: Utc::now(),
                    elapsed_ms: start_time.elapsed().as_millis() as u64,
                };

                info!(
                    batch_id = %self.batch_id,
                    type_name = %identified.type_name(),
                    score = identified.score,
                    mapped_rows = records.len(),
                    blocked = summary.blocked,
                    elapsed_ms = batch.elapsed_ms,
                    "表格检视完成"
                );

                let outcome = InspectionOutcome {
                    batch,
                    type_name: identified.type_name().to_string(),
                    score: identified.score,
                    records: records.clone(),
                    violations: violations.clone(),
                    summary,
                };

                self.state = UploadState::Idle;
                self.identified = Some(identified);
                self.previews = records;
                self.violations = violations;
                self.last_report = None;
                Ok(outcome)
            }
            Err(e) => {
                warn!(batch_id = %self.batch_id, error = %e, "表格检视失败");
                self.reset_to_file_selection();
                Err(e)
            }
        }
    }

    /// 识别 → 映射 → 校验 → 预览投影
    fn inspect_inner(
        &self,
        sheet: &RawSheet,
        allowed: Option<&[&str]>,
    ) -> ImportResult<(IdentifiedType, Vec<MappedRecord>, Vec<DqViolation>)> {
        // === 阶段 1: 类型识别 ===
        debug!("阶段 1: 类型识别");
        let candidates = match allowed {
            Some(names) => self.registry.subset(names),
            None => self.registry.all().to_vec(),
        };

        let identified = match TypeIdentifier::identify(&sheet.headers, &candidates) {
            Some(identified) => identified,
            None => {
                // 类型锁定页: 与全量注册表比对，区分"未匹配"与"匹配到其他类型"
                if let Some([expected]) = allowed {
                    if let Some(other) =
                        TypeIdentifier::identify(&sheet.headers, self.registry.all())
                    {
                        return Err(ImportError::TypeMismatch {
                            expected: expected.to_string(),
                            detected: other.type_name().to_string(),
                        });
                    }
                }
                return Err(ImportError::NoTypeIdentified {
                    candidates: TypeIdentifier::expectations(&candidates),
                });
            }
        };

        // === 阶段 2: 行映射 ===
        debug!("阶段 2: 行映射");
        let mapped = RowMapper::map_rows(sheet, &identified.config);
        if mapped.is_empty() {
            return Err(ImportError::EmptyResult);
        }

        // === 阶段 3: DQ 校验 + 预览投影 ===
        debug!("阶段 3: DQ 校验");
        let record_type = RecordType::from_name(identified.type_name());
        let violations = match record_type {
            Some(rt) => DqValidator::new(self.policy.mode).validate(&mapped, rt),
            None => Vec::new(),
        };

        // 宽松模式预览展示默认值补齐结果；
        // 严格模式及外部扩展类型保留原始映射值（缺失字段留白待编辑）
        let previews = match record_type {
            Some(rt) if !self.policy.is_strict() => {
                let today = self.today();
                let row_numbers: Vec<usize> = mapped.iter().map(|r| r.row_number).collect();
                let transformed = Transformer::transform(&mapped, rt, &self.policy, today);
                Transformer::preview(&transformed, &row_numbers)
            }
            _ => mapped,
        };

        Ok((identified, previews, violations))
    }

    // ===== 预览编辑 =====

    /// 编辑预览记录字段（空白值等价删除字段）
    pub fn set_field(&mut self, index: usize, field: &str, value: &str) -> ImportResult<()> {
        let record = self.previews.get_mut(index).ok_or_else(|| {
            ImportError::InternalError(format!("预览记录下标越界: {}", index))
        })?;
        record.set(field, value);
        Ok(())
    }

    /// 删除预览记录
    pub fn remove_record(&mut self, index: usize) -> ImportResult<()> {
        if index >= self.previews.len() {
            return Err(ImportError::InternalError(format!(
                "预览记录下标越界: {}",
                index
            )));
        }
        self.previews.remove(index);
        Ok(())
    }

    // ===== 阶段 4-5: 确认上传 =====

    /// 确认上传（无外部取消句柄）
    pub async fn confirm_upload(&mut self) -> ImportResult<UploadReport> {
        let (_handle, registration) = AbortHandle::new_pair();
        self.confirm_upload_abortable(registration).await
    }

    /// 确认上传（可取消）
    ///
    /// # 参数
    /// - registration: 取消注册（调用方持有配对的 AbortHandle）
    ///
    /// # 状态转移
    /// - Idle → Uploading → Success: 全部分组被接受，预览丢弃
    /// - Idle → Uploading → Error: 任一分组失败/超时/取消，预览原样保留
    pub async fn confirm_upload_abortable(
        &mut self,
        registration: AbortRegistration,
    ) -> ImportResult<UploadReport> {
        if self.state == UploadState::Uploading {
            return Err(ImportError::UploadInProgress);
        }

        let identified = self
            .identified
            .clone()
            .ok_or(ImportError::EmptyResult)?;
        if self.previews.is_empty() {
            return Err(ImportError::EmptyResult);
        }

        let record_type = RecordType::from_name(identified.type_name()).ok_or_else(|| {
            ImportError::InternalError(format!(
                "记录类型 {} 未注册变换规则",
                identified.type_name()
            ))
        })?;

        // 按当前预览内容重算违规（编辑可能已修复或引入缺失）
        let violations =
            DqValidator::new(self.policy.mode).validate(&self.previews, record_type);
        let summary = DqSummary::from_violations(self.previews.len(), &violations);
        self.violations = violations;
        if self.policy.is_strict() && summary.has_blocking() {
            return Err(ImportError::ValidationBlocked {
                blocked: summary.blocked,
            });
        }

        // === 阶段 4: 变换 + 批次装配 ===
        let today = self.today();
        let transformed =
            Transformer::transform(&self.previews, record_type, &self.policy, today);
        let mut batch = Batch::default();
        batch
            .groups
            .insert(identified.type_name().to_string(), transformed);

        // === 阶段 5: 上传 ===
        self.state = UploadState::Uploading;
        info!(
            batch_id = %self.batch_id,
            type_name = %identified.type_name(),
            records = batch.record_count(),
            "开始上传批次"
        );

        let uploader = Arc::clone(&self.uploader);
        let groups: Vec<_> = batch.groups.into_iter().collect();
        let dispatch = async move {
            let tasks = groups.iter().map(|(type_name, records)| {
                let uploader = Arc::clone(&uploader);
                async move {
                    let error = uploader.upload_group(type_name, records).await.err();
                    GroupOutcome {
                        type_name: type_name.clone(),
                        record_count: records.len(),
                        error,
                    }
                }
            });
            UploadReport {
                groups: futures::future::join_all(tasks).await,
            }
        };

        let timeout = self.policy.upload_timeout();
        let outcome =
            tokio::time::timeout(timeout, Abortable::new(dispatch, registration)).await;

        match outcome {
            Err(_elapsed) => {
                warn!(batch_id = %self.batch_id, timeout_secs = timeout.as_secs(), "上传超时");
                self.state = UploadState::Error;
                Err(ImportError::UploadTimeout {
                    timeout_secs: timeout.as_secs(),
                })
            }
            Ok(Err(Aborted)) => {
                warn!(batch_id = %self.batch_id, "上传被取消");
                self.state = UploadState::Error;
                Err(ImportError::UploadAborted)
            }
            Ok(Ok(report)) => {
                self.last_report = Some(report.clone());
                if report.all_succeeded() {
                    info!(
                        batch_id = %self.batch_id,
                        groups = report.groups.len(),
                        "批次上传成功"
                    );
                    self.state = UploadState::Success;
                    // 批次即弃，不保留历史
                    self.previews.clear();
                    self.violations.clear();
                    Ok(report)
                } else {
                    let message = report.failure_message().unwrap_or_default();
                    warn!(batch_id = %self.batch_id, error = %message, "批次上传失败");
                    self.state = UploadState::Error;
                    Err(ImportError::UploadFailure { message })
                }
            }
        }
    }

    /// 回到文件选择步骤（清空会话状态，换新批次 ID）
    pub fn reset_to_file_selection(&mut self) {
        self.state = UploadState::Idle;
        self.identified = None;
        self.previews.clear();
        self.violations.clear();
        self.last_report = None;
        self.batch_id = Uuid::new_v4().to_string();
    }
}
