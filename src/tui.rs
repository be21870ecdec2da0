use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::io::stdout;
use std::time::Duration;

use crate::app::{App, ToastKind, View};
use crate::models::{ManifestType, ProtocolStatus, UserRole};

const TICK_INTERVAL: Duration = Duration::from_millis(250);

pub fn run_portal(app: &mut App) -> Result<()> {
    // The company picklist is needed by the register form from the first
    // frame on; a failure just leaves it empty.
    app.refresh_companies();

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_loop(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        app.tick();
        terminal.draw(|frame| draw(frame, app))?;

        if !event::poll(TICK_INTERVAL)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            handle_key(app, key);
        }
        if app.should_quit {
            break;
        }
    }
    Ok(())
}

// --- Key handling ---

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => {
                app.quit();
                return;
            }
            KeyCode::Char('x') => {
                app.dismiss_toast();
                return;
            }
            _ => {}
        }
    }
    match app.view {
        View::Login => handle_login_key(app, key),
        View::Register => handle_register_key(app, key),
        View::Dashboard => handle_dashboard_key(app, key),
        View::NewManifest => handle_manifest_key(app, key),
        View::History => handle_history_key(app, key),
    }
}

fn handle_login_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('t') if ctrl => app.toggle_role(),
        KeyCode::Char('n') if ctrl => app.open_register(),
        KeyCode::Esc => app.quit(),
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Down | KeyCode::Up => {
            app.focus = (app.focus + 1) % 2;
        }
        KeyCode::Enter => {
            if app.focus == 0 {
                app.focus = 1;
            } else {
                app.submit_login();
            }
        }
        KeyCode::Backspace => {
            login_field_mut(app).pop();
        }
        KeyCode::Char(c) if !ctrl => login_field_mut(app).push(c),
        _ => {}
    }
}

fn login_field_mut(app: &mut App) -> &mut String {
    if app.focus == 0 {
        &mut app.login_form.identifier
    } else {
        &mut app.login_form.password
    }
}

const REGISTER_FIELD_COUNT: usize = 5;

fn handle_register_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('t') if ctrl => app.toggle_role(),
        KeyCode::Char('s') if ctrl => app.submit_registration(),
        KeyCode::Esc => app.open_login(),
        KeyCode::Tab | KeyCode::Down => app.focus = (app.focus + 1) % REGISTER_FIELD_COUNT,
        KeyCode::BackTab | KeyCode::Up => {
            app.focus = (app.focus + REGISTER_FIELD_COUNT - 1) % REGISTER_FIELD_COUNT;
        }
        KeyCode::Left if company_picker_focused(app) => app.cycle_company(-1),
        KeyCode::Right if company_picker_focused(app) => app.cycle_company(1),
        KeyCode::Enter => {
            if avatar_field_focused(app) {
                app.load_avatar();
            } else {
                app.focus = (app.focus + 1) % REGISTER_FIELD_COUNT;
            }
        }
        KeyCode::Backspace => {
            if let Some(field) = register_field_mut(app) {
                field.pop();
            }
        }
        KeyCode::Char(c) if !ctrl => {
            if let Some(field) = register_field_mut(app) {
                field.push(c);
            }
        }
        _ => {}
    }
}

// Apprentice order: name, identifier, company picker, password, confirmation.
// Company order: name, identifier, password, confirmation, avatar path.
fn register_field_mut(app: &mut App) -> Option<&mut String> {
    match (app.role, app.focus) {
        (_, 0) => Some(&mut app.register_form.name),
        (_, 1) => Some(&mut app.register_form.identifier),
        (UserRole::Apprentice, 3) => Some(&mut app.register_form.password),
        (UserRole::Apprentice, 4) => Some(&mut app.register_form.confirm_password),
        (UserRole::Company, 2) => Some(&mut app.register_form.password),
        (UserRole::Company, 3) => Some(&mut app.register_form.confirm_password),
        (UserRole::Company, 4) => Some(&mut app.register_form.avatar_path),
        _ => None,
    }
}

fn company_picker_focused(app: &App) -> bool {
    app.role == UserRole::Apprentice && app.focus == 2
}

fn avatar_field_focused(app: &App) -> bool {
    app.role == UserRole::Company && app.focus == 4
}

fn handle_dashboard_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Char('s') => app.sign_out(),
        KeyCode::Char('r') => app.refresh_dashboard(),
        KeyCode::Char('n') => app.open_new_manifest(),
        KeyCode::Char('h') => app.open_history(),
        KeyCode::Down | KeyCode::Char('j') => app.scroll = app.scroll.saturating_add(3),
        KeyCode::Up | KeyCode::Char('k') => app.scroll = app.scroll.saturating_sub(3),
        _ => {}
    }
}

fn handle_manifest_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('e') if ctrl => app.refine_description(),
        KeyCode::Char('a') if ctrl => app.apply_refinement(),
        KeyCode::Char('s') if ctrl => app.submit_manifest(),
        KeyCode::Esc => app.open_dashboard(),
        KeyCode::Tab | KeyCode::Down => app.focus = (app.focus + 1) % 3,
        KeyCode::BackTab | KeyCode::Up => app.focus = (app.focus + 2) % 3,
        KeyCode::Left => match app.focus {
            0 => app.cycle_manifest_type(-1),
            1 => app.cycle_reason(-1),
            _ => {}
        },
        KeyCode::Right => match app.focus {
            0 => app.cycle_manifest_type(1),
            1 => app.cycle_reason(1),
            _ => {}
        },
        KeyCode::Enter if app.focus == 2 => app.manifest_form.description.push('\n'),
        KeyCode::Enter => app.focus = (app.focus + 1) % 3,
        KeyCode::Backspace if app.focus == 2 => {
            app.manifest_form.description.pop();
        }
        KeyCode::Char(c) if !ctrl && app.focus == 2 => app.manifest_form.description.push(c),
        _ => {}
    }
}

fn handle_history_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('b') => app.open_dashboard(),
        KeyCode::Down | KeyCode::Char('j') => app.scroll = app.scroll.saturating_add(3),
        KeyCode::Up | KeyCode::Char('k') => app.scroll = app.scroll.saturating_sub(3),
        KeyCode::Char('r') => app.refresh_dashboard(),
        _ => {}
    }
}

// --- Drawing ---

fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    match app.view {
        View::Login => draw_login(frame, app, chunks[0]),
        View::Register => draw_register(frame, app, chunks[0]),
        View::Dashboard => draw_dashboard(frame, app, chunks[0]),
        View::NewManifest => draw_new_manifest(frame, app, chunks[0]),
        View::History => draw_history(frame, app, chunks[0]),
    }

    draw_toast(frame, app, chunks[1]);
    draw_help(frame, app, chunks[2]);
}

fn draw_login(frame: &mut Frame, app: &App, area: Rect) {
    let panel = centered_rect(60, 70, area);
    let identifier_label = match app.role {
        UserRole::Apprentice => "Matrícula (Apenas números)",
        UserRole::Company => "CNPJ da Empresa",
    };

    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(
            "PJA 3.5",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Portal Jovem Aprendiz",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        role_line(app.role),
        Line::from(""),
        field_line(identifier_label, app.login_form.identifier.clone(), app.focus == 0),
        field_line("Senha", masked(&app.login_form.password), app.focus == 1),
        Line::from(""),
        Line::from(Span::styled(
            "Ctrl+N: Ainda não tenho acesso",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    if app.loading {
        lines.push(Line::from(Span::styled(
            "Aguarde...",
            Style::default().fg(Color::Yellow),
        )));
    }

    let widget = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(" Acessar Portal "))
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, panel);
}

fn draw_register(frame: &mut Frame, app: &App, area: Rect) {
    let panel = centered_rect(70, 80, area);
    let form = &app.register_form;
    let identifier_label = match app.role {
        UserRole::Apprentice => "Número de Matrícula",
        UserRole::Company => "CNPJ",
    };

    let mut lines: Vec<Line> = vec![
        role_line(app.role),
        Line::from(""),
        field_line("Nome Completo ou Razão Social", form.name.clone(), app.focus == 0),
        field_line(identifier_label, form.identifier.clone(), app.focus == 1),
    ];

    match app.role {
        UserRole::Apprentice => {
            let company = app
                .selected_company_name()
                .map(|name| format!("< {name} >"))
                .unwrap_or_else(|| "< Selecione sua Empresa >".to_string());
            lines.push(field_line("Empresa de vínculo", company, app.focus == 2));
            lines.push(field_line("Defina sua senha", masked(&form.password), app.focus == 3));
            lines.push(field_line(
                "Confirme sua senha",
                masked(&form.confirm_password),
                app.focus == 4,
            ));
        }
        UserRole::Company => {
            lines.push(field_line("Defina sua senha", masked(&form.password), app.focus == 2));
            lines.push(field_line(
                "Confirme sua senha",
                masked(&form.confirm_password),
                app.focus == 3,
            ));
            lines.push(field_line(
                "Logotipo (caminho do arquivo)",
                form.avatar_path.clone(),
                app.focus == 4,
            ));
            let status = if form.avatar_data.is_some() {
                "Logotipo da Empresa: carregado"
            } else {
                "Logotipo da Empresa: pendente"
            };
            lines.push(Line::from(Span::styled(
                status,
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Esc: Já tenho uma conta",
        Style::default().fg(Color::DarkGray),
    )));
    if app.loading {
        lines.push(Line::from(Span::styled(
            "Processando...",
            Style::default().fg(Color::Yellow),
        )));
    }

    let widget = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(" Criar minha conta "))
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, panel);
}

fn draw_dashboard(frame: &mut Frame, app: &App, area: Rect) {
    match app.user_role() {
        Some(UserRole::Company) => draw_company_dashboard(frame, app, area),
        _ => draw_apprentice_dashboard(frame, app, area),
    }
}

fn draw_apprentice_dashboard(frame: &mut Frame, app: &App, area: Rect) {
    let name = app
        .user
        .as_ref()
        .map(|u| first_name(&u.name).to_string())
        .unwrap_or_default();

    let lines: Vec<Line> = vec![
        Line::from(Span::styled(
            format!("Olá, {name}"),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Sua voz importa no Portal Jovem Aprendiz.",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("[n] Criar Manifestação", Style::default().fg(Color::Cyan)),
            Span::raw("   Registre elogios ou feedbacks com suporte da IA."),
        ]),
        Line::from(vec![
            Span::styled("[h] Meus Protocolos", Style::default().fg(Color::Cyan)),
            Span::raw(format!("      {} registros ativos.", app.protocols.len())),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Lei do Aprendiz", Style::default().fg(Color::Green)),
            Span::raw("   Acesse seus direitos (Lei 10.097/2000)."),
        ]),
    ];

    let widget = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(" Dashboard "))
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, area);
}

fn draw_company_dashboard(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(
            "Mural da Empresa",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Gestão de elogios e transparência.",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        Line::from(vec![
            Span::raw("Aprendizes: "),
            Span::styled(
                app.stats.apprentice_count.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Reconhecimento",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    if app.stats.praises.is_empty() {
        lines.push(Line::from(Span::styled(
            "Sem elogios no momento.",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        for praise in &app.stats.praises {
            for wrapped in textwrap::fill(&format!("\"{}\"", praise.description), 70).lines() {
                lines.push(Line::from(Span::styled(
                    wrapped.to_string(),
                    Style::default().add_modifier(Modifier::ITALIC),
                )));
            }
            lines.push(Line::from(Span::styled(
                format!("{} · {}", praise.reason, short_date(&praise.created_at)),
                Style::default().fg(Color::DarkGray),
            )));
            lines.push(Line::from(""));
        }
    }

    let widget = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(" Mural "))
        .wrap(Wrap { trim: false })
        .scroll((app.scroll, 0));
    frame.render_widget(widget, area);
}

fn draw_new_manifest(frame: &mut Frame, app: &App, area: Rect) {
    let form = &app.manifest_form;
    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(
            "Nova Manifestação",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Tipo de Manifestação",
            Style::default().fg(Color::DarkGray),
        )),
        manifest_type_line(form.kind, app.focus == 0),
        Line::from(""),
        Line::from(Span::styled(
            "Assunto Principal",
            Style::default().fg(Color::DarkGray),
        )),
        field_line("Assunto", format!("< {} >", form.reason()), app.focus == 1),
        Line::from(""),
        Line::from(Span::styled(
            "Descrição Detalhada",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    if form.description.is_empty() && app.focus != 2 {
        lines.push(Line::from(Span::styled(
            "Relate aqui sua experiência...",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        let mut text = form.description.clone();
        if app.focus == 2 {
            text.push('▌');
        }
        for line in text.lines() {
            lines.push(Line::from(line.to_string()));
        }
    }

    lines.push(Line::from(""));
    let refine_hint = if form.description.is_empty() {
        Span::styled(
            "Ctrl+E: Refinar com IA (escreva uma descrição primeiro)",
            Style::default().fg(Color::DarkGray),
        )
    } else {
        Span::styled("Ctrl+E: Refinar com IA", Style::default().fg(Color::Magenta))
    };
    lines.push(Line::from(refine_hint));

    if let Some(analysis) = &form.analysis {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Análise Jurídica PJA",
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        )));
        for wrapped in textwrap::fill(&format!("\"{}\"", analysis.refined_text), 70).lines() {
            lines.push(Line::from(Span::styled(
                wrapped.to_string(),
                Style::default().add_modifier(Modifier::ITALIC),
            )));
        }
        for wrapped in textwrap::fill(&analysis.legal_analysis, 70).lines() {
            lines.push(Line::from(Span::styled(
                wrapped.to_string(),
                Style::default().fg(Color::DarkGray),
            )));
        }
        lines.push(Line::from(Span::styled(
            "Ctrl+A: Aplicar Sugestão",
            Style::default().fg(Color::Cyan),
        )));
    }

    if app.loading {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Processando...",
            Style::default().fg(Color::Yellow),
        )));
    }

    let widget = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(" Manifestar "))
        .wrap(Wrap { trim: false })
        .scroll((app.scroll, 0));
    frame.render_widget(widget, area);
}

fn draw_history(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();

    if app.protocols.is_empty() {
        lines.push(Line::from(Span::styled(
            "Nenhum protocolo encontrado.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    for protocol in &app.protocols {
        let type_style = match protocol.kind {
            ManifestType::Praise => Style::default().fg(Color::Green),
            ManifestType::Complaint | ManifestType::Doubt => Style::default().fg(Color::Red),
        };
        lines.push(Line::from(vec![
            Span::styled(
                protocol.reason.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(protocol.kind.as_str(), type_style),
        ]));
        for wrapped in textwrap::fill(&format!("\"{}\"", protocol.description), 70).lines() {
            lines.push(Line::from(Span::styled(
                wrapped.to_string(),
                Style::default().add_modifier(Modifier::ITALIC),
            )));
        }
        lines.push(Line::from(Span::styled(
            format!(
                "PROTOCOLO: {} · {}",
                protocol.id,
                short_date(&protocol.created_at)
            ),
            Style::default().fg(Color::DarkGray),
        )));
        let status_style = match protocol.status {
            ProtocolStatus::Concluded => Style::default().fg(Color::Green),
            ProtocolStatus::Received | ProtocolStatus::Analyzing => {
                Style::default().fg(Color::Yellow)
            }
        };
        lines.push(Line::from(Span::styled(
            status_label(protocol.status),
            status_style,
        )));
        lines.push(Line::from(""));
    }

    let widget = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(format!(
            " Histórico ({}) ",
            app.protocols.len()
        )))
        .wrap(Wrap { trim: false })
        .scroll((app.scroll, 0));
    frame.render_widget(widget, area);
}

fn draw_toast(frame: &mut Frame, app: &App, area: Rect) {
    if app.loading {
        let widget =
            Paragraph::new(" Aguarde...").style(Style::default().fg(Color::Yellow));
        frame.render_widget(widget, area);
        return;
    }
    let Some(toast) = &app.toast else {
        return;
    };
    let style = match toast.kind {
        ToastKind::Success => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ToastKind::Error => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    };
    let widget = Paragraph::new(format!(" {}", toast.message)).style(style);
    frame.render_widget(widget, area);
}

fn draw_help(frame: &mut Frame, app: &App, area: Rect) {
    let text = match app.view {
        View::Login => " Tab:campo  Enter:acessar  Ctrl+T:papel  Ctrl+N:cadastro  Esc:sair",
        View::Register => match app.role {
            UserRole::Apprentice => {
                " Tab:campo  ←/→:empresa  Ctrl+S:criar conta  Ctrl+T:papel  Esc:voltar"
            }
            UserRole::Company => {
                " Tab:campo  Enter:carregar logotipo  Ctrl+S:criar conta  Ctrl+T:papel  Esc:voltar"
            }
        },
        View::Dashboard => match app.user_role() {
            Some(UserRole::Company) => " r:atualizar  j/k:rolar  s:encerrar sessão  q:sair",
            _ => " n:manifestar  h:histórico  r:atualizar  s:encerrar sessão  q:sair",
        },
        View::NewManifest => {
            " Tab:campo  ←/→:alterar  Ctrl+E:refinar  Ctrl+A:aplicar  Ctrl+S:registrar  Esc:cancelar"
        }
        View::History => " j/k:rolar  r:atualizar  Esc:voltar",
    };
    let help = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, area);
}

// --- Display helpers ---

fn role_line(role: UserRole) -> Line<'static> {
    let selected = Style::default()
        .bg(Color::DarkGray)
        .add_modifier(Modifier::BOLD);
    let idle = Style::default().fg(Color::DarkGray);
    let (apprentice_style, company_style) = match role {
        UserRole::Apprentice => (selected, idle),
        UserRole::Company => (idle, selected),
    };
    Line::from(vec![
        Span::styled(" Aprendiz ", apprentice_style),
        Span::raw("  "),
        Span::styled(" Empresa ", company_style),
    ])
}

fn manifest_type_line(kind: ManifestType, focused: bool) -> Line<'static> {
    let selected = Style::default()
        .bg(Color::DarkGray)
        .add_modifier(Modifier::BOLD);
    let idle = Style::default().fg(Color::DarkGray);
    let marker = if focused { "> " } else { "  " };
    let mut spans = vec![Span::raw(marker.to_string())];
    for manifest_type in ManifestType::ALL {
        let style = if manifest_type == kind { selected } else { idle };
        spans.push(Span::styled(format!(" {} ", manifest_type.as_str()), style));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

fn field_line(label: &str, value: String, focused: bool) -> Line<'static> {
    let marker = if focused { "> " } else { "  " };
    let value_style = if focused {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    Line::from(vec![
        Span::styled(
            format!("{marker}{label}: "),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(value, value_style),
    ])
}

fn masked(password: &str) -> String {
    "•".repeat(password.chars().count())
}

fn first_name(name: &str) -> &str {
    name.split_whitespace().next().unwrap_or(name)
}

fn status_label(status: ProtocolStatus) -> &'static str {
    match status {
        ProtocolStatus::Concluded => "Concluído",
        ProtocolStatus::Received | ProtocolStatus::Analyzing => "Processando",
    }
}

fn short_date(timestamp: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(timestamp)
        .map(|dt| dt.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|_| timestamp.to_string())
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
