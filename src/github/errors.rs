use octocrab::Error as OctocrabError;

#[derive(Debug)]
pub enum GitHubError {
    TokenNotFound(String),
    InvalidRepository(String),
    ApiError(OctocrabError),
    MissingField {
        resource: String,
        field: &'static str,
    },
}

impl From<OctocrabError> for GitHubError {
    fn from(err: OctocrabError) -> Self {
        GitHubError::ApiError(err)
    }
}

impl std::fmt::Display for GitHubError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GitHubError::TokenNotFound(msg) => {
                writeln!(f, "GitHub Authentication Error")?;
                writeln!(f, "──────────────────────────")?;
                write!(f, "🔑 {msg}\n\n")?;
                writeln!(f, "🔧 QUICK FIXES:")?;
                writeln!(f, "   → Pass the token explicitly: backporter run --token <TOKEN> ...")?;
                writeln!(f, "   → Set it in the environment: export GITHUB_TOKEN=your_token")?;
                write!(
                    f,
                    "   → In GitHub Actions: env: GITHUB_TOKEN: ${{{{ secrets.GITHUB_TOKEN }}}}"
                )
            }
            GitHubError::InvalidRepository(value) => {
                writeln!(f, "Invalid Repository Identifier")?;
                writeln!(f, "────────────────────────────")?;
                write!(f, "📂 '{value}' is not of the form owner/name\n\n")?;
                writeln!(f, "🔧 QUICK FIXES:")?;
                write!(f, "   → Use the full name, e.g. backporter run octo-org/octo-repo 42")
            }
            GitHubError::ApiError(octocrab_err) => {
                writeln!(f, "GitHub API Error")?;
                writeln!(f, "────────────────")?;

                match octocrab_err {
                    octocrab::Error::GitHub { source, .. } => {
                        writeln!(f, "🌐 HTTP {}: {}", source.status_code, source.message)?;
                        writeln!(f)?;

                        match source.status_code.as_u16() {
                            401 => {
                                writeln!(f, "🔧 AUTHENTICATION FAILED:")?;
                                writeln!(f, "   → Token is invalid or expired")?;
                                write!(f, "   → Generate a new token with 'repo' scope")
                            }
                            403 => {
                                writeln!(f, "🔧 PERMISSION DENIED:")?;
                                writeln!(f, "   → Token lacks permission to comment or open pull requests")?;
                                write!(
                                    f,
                                    "   → In GitHub Actions grant 'contents: write' and 'pull-requests: write'"
                                )
                            }
                            404 => {
                                writeln!(f, "🔧 RESOURCE NOT FOUND:")?;
                                writeln!(f, "   → Repository or pull request does not exist")?;
                                write!(f, "   → Check the owner/name and pull request number")
                            }
                            422 => {
                                writeln!(f, "🔧 VALIDATION ERROR:")?;
                                writeln!(f, "   → GitHub rejected the request data")?;
                                write!(f, "   → A pull request for this backport branch may already exist")
                            }
                            _ => {
                                writeln!(f, "🔧 TROUBLESHOOTING:")?;
                                writeln!(f, "   → Test connection: curl -I https://api.github.com")?;
                                write!(f, "   → Check rate limits: gh api rate_limit")
                            }
                        }
                    }
                    octocrab::Error::Http { .. } => {
                        writeln!(f, "🌐 Network connection failed to GitHub API")?;
                        writeln!(f)?;
                        writeln!(f, "🔧 TROUBLESHOOTING:")?;
                        writeln!(f, "   → Test HTTPS: curl -I https://api.github.com")?;
                        write!(f, "📊 GitHub status: https://status.github.com")
                    }
                    _ => {
                        write!(f, "🌐 {octocrab_err}\n\n")?;
                        writeln!(f, "🔧 TROUBLESHOOTING:")?;
                        writeln!(f, "   → Test connection: curl -I https://api.github.com")?;
                        write!(f, "   → Verify repository access: gh repo view")
                    }
                }
            }
            GitHubError::MissingField { resource, field } => {
                writeln!(f, "Unexpected GitHub Response")?;
                writeln!(f, "─────────────────────────")?;
                write!(f, "📄 {resource} has no '{field}' field")
            }
        }
    }
}

impl std::error::Error for GitHubError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GitHubError::ApiError(err) => Some(err),
            _ => None,
        }
    }
}
