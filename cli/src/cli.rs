mod commands;

use std::io::{self, BufRead, Write};

use anyhow::{Context as _, Result, anyhow};
use fudousan_stats_core::{
    AncestorRef, Category, Dashboard, ParentChain, SelectionNode, SeriesReport,
};

use commands::{CommandRegistry, Context};

pub fn run(dashboard: &mut Dashboard) -> Result<()> {
    print_intro(dashboard);
    let registry = CommandRegistry::default();
    let mut ctx = Context::new(dashboard);
    let stdin = io::stdin();

    loop {
        print!("選択{}件> ", ctx.dashboard().selection().count());
        io::stdout()
            .flush()
            .context("プロンプトのフラッシュに失敗しました")?;

        let mut line = String::new();
        let bytes = stdin
            .lock()
            .read_line(&mut line)
            .context("入力の読み込みに失敗しました")?;

        if bytes == 0 {
            println!("入力が終了したため終了します。");
            return Ok(());
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Err(error) = registry.execute_input(&mut ctx, trimmed) {
            println!("エラー: {error}");
        }
    }
}

fn print_intro(dashboard: &Dashboard) {
    println!("不動産取引価格ダッシュボードへようこそ。");
    match dashboard.data().current() {
        Some((collection, options)) => {
            println!("現在のデータセット: {} / {}", collection, options)
        }
        None => println!("データセットが読み込まれていません。"),
    }
    println!("コマンド例: list / select regions 関東 / select prefectures 東京都 regions:関東 / series");
    println!("help で利用可能なコマンド一覧を表示します。");
}

pub(crate) fn print_help() {
    println!("利用可能なコマンド:");
    println!("  list [category:name ...]              指定階層の地域一覧を表示");
    println!("  select <category> <name> [祖先 ...]   地域を選択 (祖先は category:name 形式)");
    println!("  deselect <category> <name>            選択を解除");
    println!("  clear                                 すべての選択を解除");
    println!("  status                                データセットと選択状況を表示");
    println!("  series                                年次系列を表形式で表示");
    println!("  chart [price|count]                   チャート用 JSON を出力");
    println!("  toggle <name>                         凡例の表示/非表示を切り替え");
    println!("  dataset [<collection> <options>]      データセット一覧 / 切り替え");
    println!("  query [<slider> <value>]              検索条件の表示 / 変更して適用");
    println!("  quit                                  終了");
}

pub(crate) fn parse_category(token: &str) -> Result<Category> {
    token.parse::<Category>().map_err(|err| anyhow!(err))
}

pub(crate) fn parse_path<'a, I>(tokens: I) -> Result<Vec<AncestorRef>>
where
    I: IntoIterator<Item = &'a str>,
{
    tokens
        .into_iter()
        .map(|token| {
            token
                .parse::<AncestorRef>()
                .map_err(|_| anyhow!("祖先は category:name 形式で指定してください: {}", token))
        })
        .collect()
}

pub(crate) fn build_node(category: Category, name: &str, path: Vec<AncestorRef>) -> Result<SelectionNode> {
    let chain = ParentChain::from_ancestors(path).map_err(|err| anyhow!(err))?;
    Ok(SelectionNode::new(category, name, chain))
}

pub(crate) fn print_area_list(dashboard: &Dashboard, path: &[AncestorRef]) -> Result<()> {
    let lookup = dashboard
        .data()
        .current_lookup()
        .ok_or_else(|| anyhow!("データセットが選択されていません。"))?;
    let names = lookup.names_under(path).map_err(|err| anyhow!(err))?;
    let category = path
        .last()
        .and_then(|ancestor| ancestor.category.child())
        .unwrap_or(Category::Region);
    println!("-- {} ({}) --", category.label(), category);
    for name in names {
        let mark = if dashboard.selection().is_selected(category, name) {
            "[x]"
        } else {
            "[ ]"
        };
        println!("  {} {}", mark, name);
    }
    Ok(())
}

pub(crate) fn print_status(dashboard: &Dashboard) {
    match dashboard.data().current() {
        Some((collection, options)) => println!("データセット: {} / {}", collection, options),
        None => println!("データセット: 未選択"),
    }
    println!("選択中: {} 件", dashboard.selection().count());
    for node in dashboard.selection().nodes() {
        let ancestry: Vec<String> = node
            .parent_chain
            .iter()
            .map(|(_, ancestor)| ancestor.name.clone())
            .collect();
        let hidden = if dashboard.view_state().is_hidden(&node.name) {
            " (非表示)"
        } else {
            ""
        };
        if ancestry.is_empty() {
            println!("  - {} [{}]{}", node.name, node.category.label(), hidden);
        } else {
            println!(
                "  - {} [{}] < {}{}",
                node.name,
                node.category.label(),
                ancestry.join(" > "),
                hidden
            );
        }
    }
    if let Some(name) = dashboard.selection().prev_removed() {
        println!("直前に解除: {}", name);
    }
}

pub(crate) fn print_series(dashboard: &Dashboard, report: &SeriesReport) {
    let years = dashboard.config().year_range.as_slice();
    print!("{:<12}|", "地域");
    for year in years {
        print!(" {:>8}", year);
    }
    println!();
    for series in &report.series {
        print!("{:<12}|", series.id);
        for value in &series.price {
            print!(" {:>8}", format_value(*value));
        }
        println!("  (価格)");
        print!("{:<12}|", "");
        for value in &series.count {
            print!(" {:>8}", format_value(*value));
        }
        println!("  (件数)");
    }
    for unresolved in &report.unresolved {
        println!(
            "未解決: {} [{}] - {}",
            unresolved.id,
            unresolved.category.label(),
            unresolved.miss
        );
    }
}

fn format_value(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{:.1}", value),
        None => "-".to_string(),
    }
}
