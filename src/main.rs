// ==========================================
// 教务管理系统 - 批量导入命令行入口
// ==========================================
// 用途: 对本地表格文件执行导入管道演练
// 流程: 解码 → 识别 → 映射 → 校验 → (可选) 演练上传
// 输出: 检视结果 JSON（识别类型、记录预览、DQ 统计）
// ==========================================

use edu_import::api::{ImportApi, InspectApiResponse};
use edu_import::config::{HeaderConfigRegistry, ImportPolicy};
use edu_import::importer::NoopUploader;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// 命令行参数
struct CliArgs {
    file: PathBuf,
    type_lock: Option<String>,
    strict: bool,
    rehearse_upload: bool,
    registry_file: Option<PathBuf>,
}

fn print_usage() {
    println!("==================================================");
    println!("{}", edu_import::APP_NAME);
    println!("系统版本: {}", edu_import::VERSION);
    println!("==================================================");
    println!();
    println!("用法: edu-import <表格文件> [选项]");
    println!();
    println!("选项:");
    println!("  --type <TYPE>      类型锁定（如 STUDENT，仅允许该类型）");
    println!("  --strict           严格模式（缺失字段阻断而非补默认值）");
    println!("  --upload           演练上传（经空上传器走完状态机）");
    println!("  --registry <FILE>  追加 JSON 表头配置文件");
}

fn parse_args() -> Option<CliArgs> {
    let mut args = std::env::args().skip(1);
    let file = PathBuf::from(args.next()?);

    let mut parsed = CliArgs {
        file,
        type_lock: None,
        strict: false,
        rehearse_upload: false,
        registry_file: None,
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--type" => parsed.type_lock = args.next(),
            "--strict" => parsed.strict = true,
            "--upload" => parsed.rehearse_upload = true,
            "--registry" => parsed.registry_file = args.next().map(PathBuf::from),
            other => {
                eprintln!("未知选项: {}", other);
                return None;
            }
        }
    }
    Some(parsed)
}

#[tokio::main]
async fn main() -> ExitCode {
    edu_import::logging::init();

    let args = match parse_args() {
        Some(args) => args,
        None => {
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    // 装配注册表（内置 + 可选外部扩展）
    let mut registry = HeaderConfigRegistry::builtin();
    if let Some(path) = &args.registry_file {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("配置文件读取失败: {}", e);
                return ExitCode::FAILURE;
            }
        };
        if let Err(e) = registry.extend_from_json_str(&json) {
            eprintln!("配置文件装配失败: {}", e);
            return ExitCode::FAILURE;
        }
    }

    let policy = if args.strict {
        ImportPolicy::strict()
    } else {
        ImportPolicy::lenient()
    };

    let api = ImportApi::new(registry, policy);
    let allowed_names: Option<Vec<&str>> =
        args.type_lock.as_deref().map(|name| vec![name]);

    if args.rehearse_upload {
        rehearse(&api, &args, allowed_names.as_deref()).await
    } else {
        inspect_only(&api, &args, allowed_names.as_deref())
    }
}

/// 仅检视: 打印识别结果与预览 JSON
fn inspect_only(api: &ImportApi, args: &CliArgs, allowed: Option<&[&str]>) -> ExitCode {
    match api.inspect_file(&args.file, allowed) {
        Ok(response) => {
            print_inspect(&response);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", ImportApi::user_message(&e));
            ExitCode::FAILURE
        }
    }
}

/// 演练上传: 检视后经空上传器走完 Idle → Uploading → Success
async fn rehearse(api: &ImportApi, args: &CliArgs, allowed: Option<&[&str]>) -> ExitCode {
    let mut session = api.session(Arc::new(NoopUploader));

    let outcome = match session.inspect_path(&args.file, allowed) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("{}", ImportApi::user_message(&e.into()));
            return ExitCode::FAILURE;
        }
    };

    println!(
        "识别类型: {} (得分 {}), 映射 {}/{} 行",
        outcome.type_name, outcome.score, outcome.batch.mapped_rows, outcome.batch.total_rows
    );

    match session.confirm_upload().await {
        Ok(report) => {
            println!(
                "演练上传完成: {} 个分组, 最终状态 {}",
                report.groups.len(),
                session.state()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", ImportApi::user_message(&e.into()));
            ExitCode::FAILURE
        }
    }
}

fn print_inspect(response: &InspectApiResponse) {
    match serde_json::to_string_pretty(response) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("结果序列化失败: {}", e),
    }
}
