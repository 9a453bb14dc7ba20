//! Guidance page and the 404 fallback

use axum::{
    http::StatusCode,
    response::{Html, Response},
};

use super::layout::{escape, message_page, page};

struct Step {
    title: &'static str,
    text: &'static str,
}

struct Contact {
    title: &'static str,
    number: &'static str,
    text: &'static str,
    link: &'static str,
}

const STEPS: &[Step] = &[
    Step {
        title: "Analise Cuidadosamente",
        text: "Observe com atenção as fotos e características das pessoas desaparecidas.",
    },
    Step {
        title: "Avalie suas Informações",
        text: "Certifique-se de que suas informações são relevantes e verdadeiras.",
    },
    Step {
        title: "Entre em Contato",
        text: "Ligue imediatamente para 197 ou use nosso formulário online.",
    },
    Step {
        title: "Forneça Detalhes",
        text: "Compartilhe local, data, hora e circunstâncias do avistamento.",
    },
];

const TIPS: &[Step] = &[
    Step {
        title: "Seja Específico com Localizações",
        text: "Forneça endereços completos, pontos de referência ou coordenadas GPS quando possível.",
    },
    Step {
        title: "Documente com Fotos",
        text: "Se possível, tire fotos discretas que possam ajudar na identificação ou localização.",
    },
    Step {
        title: "Anote Data e Hora",
        text: "Registre com precisão quando e onde você viu a pessoa desaparecida.",
    },
    Step {
        title: "Mantenha Discrição",
        text: "Não aborde diretamente a pessoa. Entre em contato com as autoridades primeiro.",
    },
];

const CONTACTS: &[Contact] = &[
    Contact {
        title: "Polícia Civil",
        number: "197",
        text: "Atendimento 24h especializado em pessoas desaparecidas",
        link: "https://www.pjc.mt.gov.br",
    },
    Contact {
        title: "Polícia Militar",
        number: "190",
        text: "Para situações de emergência e apoio imediato",
        link: "https://www.pm.mt.gov.br",
    },
    Contact {
        title: "Delegacia da Mulher",
        number: "(65) 3901-4277",
        text: "Atendimento da Delegacia da Mulher",
        link: "https://www.pjc.mt.gov.br",
    },
];

fn steps_html(steps: &[Step]) -> String {
    steps
        .iter()
        .enumerate()
        .map(|(i, s)| {
            format!(
                "                <li><strong>{}. {}</strong><br>{}</li>\n",
                i + 1,
                escape(s.title),
                escape(s.text)
            )
        })
        .collect()
}

/// GET /como-ajudar
pub async fn como_ajudar_page() -> Html<String> {
    let contacts: String = CONTACTS
        .iter()
        .map(|c| {
            let tel: String = c.number.chars().filter(|ch| ch.is_ascii_digit()).collect();
            format!(
                r#"            <div class="stat">
                <h3>{title}</h3>
                <div class="stat-value"><a href="tel:{tel}">{number}</a></div>
                <p>{text}</p>
                <p><a href="{link}" rel="noopener">Acessar Site</a></p>
            </div>
"#,
                title = escape(c.title),
                tel = tel,
                number = escape(c.number),
                text = escape(c.text),
                link = escape(c.link),
            )
        })
        .collect();

    let body = format!(
        r#"        <p><a href="/">&laquo; Voltar para a listagem</a></p>
        <section class="panel">
            <h2>Guia Completo de Colaboração</h2>
            <p>Sua colaboração pode ser fundamental para reunir famílias e salvar vidas.
            Saiba como contribuir de forma efetiva e responsável.</p>
        </section>
        <div class="alert alert-error">
            <strong>Importante:</strong> Se você possui informações urgentes sobre uma pessoa
            desaparecida, ligue imediatamente para <strong>197</strong>. Não espere para
            preencher formulários online.
        </div>
        <section class="panel">
            <h2>Como Proceder</h2>
            <ol>
{steps}            </ol>
        </section>
        <section class="panel">
            <h2>Dicas Importantes</h2>
            <ul>
{tips}            </ul>
        </section>
        <h2>Contatos de Emergência</h2>
        <div class="stats">
{contacts}        </div>
"#,
        steps = steps_html(STEPS),
        tips = steps_html(TIPS),
        contacts = contacts,
    );

    Html(page("Como ajudar", &body))
}

/// Fallback for unknown routes
pub async fn not_found_page() -> Response {
    message_page(
        StatusCode::NOT_FOUND,
        "Página não encontrada",
        "A página que você procura não existe ou foi removida.",
    )
}
