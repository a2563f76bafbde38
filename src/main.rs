use anyhow::Result;
use clap::Parser;
use qa_dataset_builder::cli::{Cli, Command};
use qa_dataset_builder::models::loaders::expand_inputs;
use qa_dataset_builder::utils::logging;
use qa_dataset_builder::App;

#[tokio::main]
async fn main() -> Result<()> {
    // .env 中的变量（已存在的环境变量优先）
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // 加载配置
    let config = cli.load_config()?;

    // 初始化日志
    logging::init(cli.verbose || config.verbose_logging);

    match &cli.command {
        Command::Prompts { kind } => {
            print!("{}", kind.default_text());
        }
        Command::Check => {
            let app = App::initialize(config)?;
            let checks = app.check_connection().await;
            if checks.iter().any(|check| check.result.is_err()) {
                anyhow::bail!("API 连接测试失败");
            }
        }
        Command::Generate(args) => {
            let config = args.apply(config)?;
            let export = args.export_options(&config);
            let inputs = expand_inputs(&args.inputs).await?;

            // 初始化并运行应用
            let app = App::initialize(config)?;
            let report = app.run(&inputs, &export).await?;

            if report.records().is_empty() {
                anyhow::bail!("没有生成任何问答对");
            }
        }
    }

    Ok(())
}
