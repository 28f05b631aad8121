use std::collections::HashMap;
use std::process;

use anyhow::{Result, anyhow, bail};
use fudousan_stats_core::{Dashboard, QueryOptions};

use super::{
    build_node, parse_category, parse_path, print_area_list, print_help, print_series,
    print_status,
};

pub struct Context<'a> {
    dashboard: &'a mut Dashboard,
    query: QueryOptions,
}

impl<'a> Context<'a> {
    pub fn new(dashboard: &'a mut Dashboard) -> Self {
        Self {
            dashboard,
            query: QueryOptions::default(),
        }
    }

    pub fn dashboard(&self) -> &Dashboard {
        &*self.dashboard
    }

    pub fn dashboard_mut(&mut self) -> &mut Dashboard {
        &mut *self.dashboard
    }

    /// Filter conditions behind the dataset currently charted.
    pub fn query(&self) -> &QueryOptions {
        &self.query
    }
}

pub struct Args<'a> {
    tokens: Vec<&'a str>,
    index: usize,
}

impl<'a> Args<'a> {
    pub fn new(tokens: Vec<&'a str>) -> Self {
        Self { tokens, index: 0 }
    }

    pub fn next(&mut self) -> Option<&'a str> {
        if self.index >= self.tokens.len() {
            return None;
        }
        let value = self.tokens[self.index];
        self.index += 1;
        Some(value)
    }

    pub fn next_required(&mut self, message: &str) -> Result<&'a str> {
        self.next().ok_or_else(|| anyhow!(message.to_owned()))
    }

    pub fn rest(&mut self) -> Vec<&'a str> {
        let rest = self.tokens[self.index..].to_vec();
        self.index = self.tokens.len();
        rest
    }
}

pub trait Command {
    fn name() -> &'static str;
    fn execute(ctx: &mut Context<'_>, args: Args<'_>) -> Result<()>;
}

type CommandFn = fn(&mut Context<'_>, Args<'_>) -> Result<()>;

pub struct CommandRegistry {
    handlers: HashMap<&'static str, CommandFn>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn register<C: Command>(&mut self) {
        let name = C::name();
        if self.handlers.insert(name, C::execute).is_some() {
            panic!("重複したコマンド登録です: {name}");
        }
    }

    pub fn dispatch(&self, command: &str, ctx: &mut Context<'_>, args: Args<'_>) -> Result<()> {
        if let Some(handler) = self.handlers.get(command) {
            handler(ctx, args)
        } else {
            bail!("未対応のコマンドです: {command}. help で一覧を確認してください。");
        }
    }

    pub fn execute_input(&self, ctx: &mut Context<'_>, input: &str) -> Result<()> {
        let mut parts = input.split_whitespace();
        let Some(head) = parts.next() else {
            return Err(anyhow!("コマンドが指定されていません。"));
        };
        let command_name = head.to_ascii_lowercase();
        let args = Args::new(parts.collect());
        self.dispatch(command_name.as_str(), ctx, args)
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register::<HelpCommand>();
        registry.register::<HelpAliasCommand>();
        registry.register::<ListCommand>();
        registry.register::<SelectCommand>();
        registry.register::<DeselectCommand>();
        registry.register::<ClearCommand>();
        registry.register::<StatusCommand>();
        registry.register::<SeriesCommand>();
        registry.register::<ChartCommand>();
        registry.register::<ToggleCommand>();
        registry.register::<DatasetCommand>();
        registry.register::<QueryCommand>();
        registry.register::<QuitCommand>();
        registry.register::<ExitCommand>();
        registry
    }
}

pub struct HelpCommand;

impl Command for HelpCommand {
    fn name() -> &'static str {
        "help"
    }

    fn execute(_ctx: &mut Context<'_>, _args: Args<'_>) -> Result<()> {
        print_help();
        Ok(())
    }
}

pub struct HelpAliasCommand;

impl Command for HelpAliasCommand {
    fn name() -> &'static str {
        "?"
    }

    fn execute(ctx: &mut Context<'_>, args: Args<'_>) -> Result<()> {
        HelpCommand::execute(ctx, args)
    }
}

pub struct ListCommand;

impl Command for ListCommand {
    fn name() -> &'static str {
        "list"
    }

    fn execute(ctx: &mut Context<'_>, mut args: Args<'_>) -> Result<()> {
        let path = parse_path(args.rest())?;
        print_area_list(ctx.dashboard(), &path)
    }
}

pub struct SelectCommand;

impl Command for SelectCommand {
    fn name() -> &'static str {
        "select"
    }

    fn execute(ctx: &mut Context<'_>, mut args: Args<'_>) -> Result<()> {
        let category = parse_category(args.next_required("カテゴリを指定してください。")?)?;
        let name = args.next_required("地域名を指定してください。")?;
        let path = parse_path(args.rest())?;
        let node = build_node(category, name, path)?;
        ctx.dashboard_mut().select(node);
        println!("{} ({}) を選択しました。", name, category.label());
        Ok(())
    }
}

pub struct DeselectCommand;

impl Command for DeselectCommand {
    fn name() -> &'static str {
        "deselect"
    }

    fn execute(ctx: &mut Context<'_>, mut args: Args<'_>) -> Result<()> {
        let category = parse_category(args.next_required("カテゴリを指定してください。")?)?;
        let name = args.next_required("地域名を指定してください。")?;
        ctx.dashboard_mut()
            .deselect(category, name)
            .map_err(|err| anyhow!(err))?;
        println!("{} の選択を解除しました。", name);
        Ok(())
    }
}

pub struct ClearCommand;

impl Command for ClearCommand {
    fn name() -> &'static str {
        "clear"
    }

    fn execute(ctx: &mut Context<'_>, _args: Args<'_>) -> Result<()> {
        ctx.dashboard_mut().clear_selection();
        println!("すべての選択を解除しました。");
        Ok(())
    }
}

pub struct StatusCommand;

impl Command for StatusCommand {
    fn name() -> &'static str {
        "status"
    }

    fn execute(ctx: &mut Context<'_>, _args: Args<'_>) -> Result<()> {
        print_status(ctx.dashboard());
        Ok(())
    }
}

pub struct SeriesCommand;

impl Command for SeriesCommand {
    fn name() -> &'static str {
        "series"
    }

    fn execute(ctx: &mut Context<'_>, _args: Args<'_>) -> Result<()> {
        let report = ctx.dashboard().series();
        print_series(ctx.dashboard(), &report);
        Ok(())
    }
}

pub struct ChartCommand;

impl Command for ChartCommand {
    fn name() -> &'static str {
        "chart"
    }

    fn execute(ctx: &mut Context<'_>, mut args: Args<'_>) -> Result<()> {
        let view = ctx.dashboard().render();
        let body = match args.next().map(|token| token.to_ascii_lowercase()) {
            None => serde_json::to_string_pretty(&view)?,
            Some(kind) => {
                let chart = match kind.as_str() {
                    "price" | "line" => &view.price_chart,
                    "count" | "bar" => &view.count_chart,
                    other => bail!("未知のチャートです: {} (price または count)", other),
                };
                serde_json::to_string_pretty(chart)?
            }
        };
        println!("{body}");
        Ok(())
    }
}

pub struct ToggleCommand;

impl Command for ToggleCommand {
    fn name() -> &'static str {
        "toggle"
    }

    fn execute(ctx: &mut Context<'_>, mut args: Args<'_>) -> Result<()> {
        let label = args.next_required("切り替える凡例名を指定してください。")?;
        let dashboard = ctx.dashboard_mut();
        dashboard.toggle_dataset(label);
        let state = if dashboard.view_state().is_hidden(label) {
            "非表示"
        } else {
            "表示"
        };
        println!("{} を{}にしました。", label, state);
        Ok(())
    }
}

pub struct DatasetCommand;

impl Command for DatasetCommand {
    fn name() -> &'static str {
        "dataset"
    }

    fn execute(ctx: &mut Context<'_>, mut args: Args<'_>) -> Result<()> {
        let Some(collection) = args.next() else {
            let current = ctx.dashboard().data().current();
            println!("読み込み済みデータセット:");
            for key in ctx.dashboard().data().keys() {
                let mark = if Some(key) == current { "*" } else { " " };
                println!("  {} {} / {}", mark, key.0, key.1);
            }
            return Ok(());
        };
        let options = args.next_required("options キーを指定してください。")?;
        ctx.dashboard_mut()
            .switch_dataset(collection, options)
            .map_err(|err| anyhow!(err))?;
        println!("データセットを {} / {} に切り替えました。", collection, options);
        Ok(())
    }
}

pub struct QueryCommand;

impl Command for QueryCommand {
    fn name() -> &'static str {
        "query"
    }

    fn execute(ctx: &mut Context<'_>, mut args: Args<'_>) -> Result<()> {
        let mut query = ctx.query;
        if let Some(slider) = args.next() {
            let value = args.next_required("設定値を指定してください。")?;
            query.set(slider, value)?;
        }
        println!("検索条件: {}", query.describe());
        println!(
            "対応データセット: {} / {}",
            query.collection_key(),
            query.options_key()
        );
        ctx.dashboard_mut().apply_query(&query).map_err(|err| {
            anyhow!("{err} (検索条件は変更前のまま維持されます)")
        })?;
        ctx.query = query;
        println!("データセットを切り替えました。");
        Ok(())
    }
}

pub struct QuitCommand;

impl Command for QuitCommand {
    fn name() -> &'static str {
        "quit"
    }

    fn execute(_ctx: &mut Context<'_>, _args: Args<'_>) -> Result<()> {
        println!("ダッシュボードを終了します。");
        process::exit(0);
    }
}

pub struct ExitCommand;

impl Command for ExitCommand {
    fn name() -> &'static str {
        "exit"
    }

    fn execute(ctx: &mut Context<'_>, args: Args<'_>) -> Result<()> {
        QuitCommand::execute(ctx, args)
    }
}
