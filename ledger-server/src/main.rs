use anyhow::Context;
use ledger_server::{Config, Server, ServerState, print_banner, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 设置环境 (dotenv, 日志)
    setup_environment()?;

    print_banner();

    // 2. 加载配置
    let config = Config::from_env();
    tracing::info!(
        work_dir = %config.work_dir,
        port = config.http_port,
        environment = %config.environment,
        "Ledger server starting..."
    );

    // 3. 打开账本 (打不开就退出)
    let state = match ServerState::initialize(&config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "Failed to open ledger storage, aborting");
            return Err(e).context("ledger startup failed");
        }
    };

    // 4. 启动 HTTP 服务器 (Server::run 会启动后台任务)
    let server = Server::with_state(config, state);
    server.run().await.context("server error")?;

    Ok(())
}
