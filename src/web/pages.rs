//! Inline HTML pages. Deliberately plain: no template engine, just enough
//! markup for a browser to drive the forms.

use crate::guard::{Denial, LOGIN_PATH};
use crate::session::Principal;

/// Escapes text for use inside HTML element content and attribute values.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="es">
    <head><meta charset="UTF-8"><title>{}</title></head>
    <body>
{}
    </body>
</html>
"#,
        escape(title),
        body
    )
}

fn error_block(error: Option<&str>) -> String {
    error
        .map(|e| format!(r#"<p class="error">{}</p>"#, escape(e)))
        .unwrap_or_default()
}

pub fn home(principal: Option<&Principal>) -> String {
    let greeting = match principal {
        Some(p) => format!(
            r#"<p>Hola, <strong>{}</strong>. <a href="/auth/logout">Cerrar sesión</a></p>"#,
            escape(&p.username)
        ),
        None => format!(
            r#"<p>Hola, invitado. <a href="{LOGIN_PATH}">Iniciar sesión</a> o <a href="/auth/registro">registrarse</a>.</p>"#
        ),
    };
    layout(
        "Catálogo de series",
        &format!(
            r#"<h1>Catálogo de series</h1>
{greeting}
<ul>
    <li><a href="/series">Series</a></li>
    <li><a href="/series/stats">Estadísticas</a></li>
    <li><a href="/juego">Adivina el número</a></li>
    <li><a href="/admin/dashboard">Administración</a></li>
</ul>"#
        ),
    )
}

pub fn login(error: Option<&str>, username: &str) -> String {
    layout(
        "Iniciar sesión",
        &format!(
            r#"<h1>Iniciar sesión</h1>
{}
<form method="post" action="{LOGIN_PATH}">
    <input name="username" value="{}" placeholder="Usuario">
    <input name="password" type="password" placeholder="Contraseña">
    <button type="submit">Entrar</button>
</form>
<p><a href="/auth/registro">Crear cuenta</a></p>"#,
            error_block(error),
            escape(username)
        ),
    )
}

pub fn register(error: Option<&str>, username: &str, email: &str) -> String {
    layout(
        "Registro",
        &format!(
            r#"<h1>Registro</h1>
{}
<form method="post" action="/auth/registro">
    <input name="username" value="{}" placeholder="Usuario">
    <input name="email" value="{}" placeholder="Email">
    <input name="password" type="password" placeholder="Contraseña">
    <input name="password_confirm" type="password" placeholder="Repite la contraseña">
    <button type="submit">Registrarse</button>
</form>"#,
            error_block(error),
            escape(username),
            escape(email)
        ),
    )
}

/// The 403 page for a [`Denial`].
pub fn forbidden(denial: &Denial) -> String {
    layout(
        "Acceso Denegado - 403",
        &format!(
            r#"<div class="error-icon">{}</div>
<h1>Acceso Denegado</h1>
<p>HTTP 403 - Forbidden</p>
<p class="error-message">{}</p>
<p class="required-role">{}</p>
<p class="current-role">Tu rol actual: {}</p>
<a href="/">Volver al Inicio</a>"#,
            escape(&denial.icon),
            escape(&denial.message),
            escape(&denial.required_role),
            escape(&denial.current_role)
        ),
    )
}

pub fn access_granted(heading: &str, principal: &Principal) -> String {
    let role = principal
        .role
        .as_deref()
        .unwrap_or(crate::guard::NO_ROLE_LABEL);
    layout(
        heading,
        &format!(
            "<p>Acceso concedido a: {}<br>Rol: {}</p>",
            escape(&principal.username),
            escape(role)
        ),
    )
}

pub fn dashboard(principal: &Principal) -> String {
    layout(
        "Panel de administración",
        &format!(
            r#"<h1>Panel de administración</h1>
<p>Sesión iniciada como {}</p>
<ul>
    <li><a href="/admin/users">Usuarios</a></li>
    <li><a href="/admin/stats">Estadísticas</a></li>
</ul>"#,
            escape(&principal.username)
        ),
    )
}

pub fn game(message: Option<&str>) -> String {
    let message = message
        .map(|m| format!("<p>{}</p>", escape(m)))
        .unwrap_or_default();
    layout(
        "Adivina el número",
        &format!(
            r#"<h1>Adivina el número (1-100)</h1>
{message}
<form method="post" action="/juego">
    <input name="numero" type="number" min="1" max="100">
    <button type="submit">Probar</button>
</form>"#
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_neutralises_markup() {
        assert_eq!(
            escape(r#"<a href="x">&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn forbidden_page_shows_every_denial_field() {
        let page = forbidden(&Denial {
            message: "Sin acceso".into(),
            required_role: "Se requiere rol: admin".into(),
            current_role: "sin rol".into(),
            icon: "🚫".into(),
        });
        for expected in ["Sin acceso", "Se requiere rol: admin", "sin rol", "🚫"] {
            assert!(page.contains(expected), "missing {expected}");
        }
    }

    #[test]
    fn login_page_escapes_the_username() {
        let page = login(Some("Usuario o contraseña incorrectos"), "<b>");
        assert!(page.contains("&lt;b&gt;"));
        assert!(page.contains("Usuario o contraseña incorrectos"));
    }
}
