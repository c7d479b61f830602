fn main() {
    prompt_tagger_lib::run()
}
